//! Result shapes for the two error policies of the library host.
//!
//! Filesystem scans and store writes fail in different ways and must be reported
//! differently:
//!
//! - [`Scanned`] is what a scan returns. It only ever holds items; a missing or
//!   unreadable folder simply yields no items, and the cause is logged.
//! - [`Persisted`] is what a store write returns. Failures are an `Err` the caller
//!   has to deal with, so a lost save is always visible to the user.

use serde::{Deserialize, Serialize};

use super::error::Result;

/// Outcome of a read-only filesystem scan. Always a success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scanned<T> {
    items: Vec<T>,
}

impl<T> Scanned<T> {
    /// A scan that found nothing, or could not look.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for Scanned<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Vec<T>> for Scanned<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for Scanned<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for Scanned<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Summary of a successful channel save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    /// Number of channels written by the operation.
    pub channels_written: usize,

    /// Id of the saved channel for single-channel saves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<i64>,

    /// Derived video count of the saved channel for single-channel saves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_count: Option<usize>,

    /// Derived total duration of the saved channel for single-channel saves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
}

/// Outcome of a store write. Failures propagate to the caller.
pub type Persisted = Result<SaveReceipt>;
