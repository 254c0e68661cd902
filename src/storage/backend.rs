//! Storage backend abstraction.
//!
//! The [`Storage`] trait covers exactly what the request worker needs: channel
//! upserts and listing, keyword search, the namespaced config area, and search
//! history. It is not a generic document API.
//!
//! Every mutating method either persists the complete new state or returns an
//! error and leaves the previous state in place.

use serde_json::Value;

use crate::domain::error::Result;
use crate::domain::{ChannelInput, Persisted};
use crate::storage::models::ChannelRecord;
use crate::storage::search::SearchHit;

/// Abstraction over persistent storage backends.
///
/// # Implementations
///
/// - [`crate::storage::JsonStorage`]: single JSON document with atomic replace
///
/// # Examples
///
/// ```no_run
/// use vidshelf::storage::{JsonStorage, Storage};
/// use std::path::PathBuf;
///
/// let storage = JsonStorage::new(PathBuf::from("/tmp/vidshelf/library.json"))?;
/// let channels = storage.list_channels()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Storage: Send {
    /// Inserts or replaces a channel, keyed by its folder path.
    ///
    /// An existing channel keeps its id and its position in the channel list;
    /// a new one is appended with a freshly minted id.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated store cannot be written.
    fn upsert_channel(&mut self, channel: &ChannelInput) -> Persisted;

    /// Replaces the whole channel list with `channels`, in order.
    ///
    /// Ids are preserved for paths that were already stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated store cannot be written.
    fn replace_all_channels(&mut self, channels: &[ChannelInput]) -> Persisted;

    /// Returns all persisted channels in persisted order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn list_channels(&self) -> Result<Vec<ChannelRecord>>;

    /// Looks up one channel by exact folder path.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_channel(&self, path: &str) -> Result<Option<ChannelRecord>>;

    /// Finds videos whose name or path contains `keyword`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn search_videos(&self, keyword: &str) -> Result<Vec<SearchHit>>;

    /// Reads a value from the config namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_config(&self, key: &str) -> Result<Option<Value>>;

    /// Writes a value into the config namespace; last write wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated store cannot be written.
    fn set_config(&mut self, key: &str, value: Value) -> Result<()>;

    /// Returns the search history, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn search_history(&self) -> Result<Vec<String>>;

    /// Moves `keyword` to the front of the search history and returns the
    /// updated history.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated store cannot be written.
    fn add_search_history(&mut self, keyword: &str) -> Result<Vec<String>>;

    /// Empties the search history.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated store cannot be written.
    fn clear_search_history(&mut self) -> Result<()>;

    /// Writes any state not yet on disk. Called once at shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn flush(&mut self) -> Result<()>;
}
