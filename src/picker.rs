//! Interactive folder selection.
//!
//! `select-directory` asks the user for a library root. How that question is put
//! depends on the host, so the worker only sees the [`DirectoryPicker`] trait.

use std::path::{Path, PathBuf};

use inquire::{InquireError, Text};

use crate::infrastructure::expand_tilde;

/// Asks the user for a directory.
pub trait DirectoryPicker {
    /// Returns the chosen directory, or `None` if the user cancelled.
    ///
    /// `start` is a suggestion for where to begin browsing.
    fn pick_directory(&mut self, start: &Path) -> Option<PathBuf>;
}

/// Prompts on the controlling terminal.
///
/// Re-asks until the answer names an existing directory; `~` is expanded.
/// Pressing Esc cancels. The prompt is drawn on stderr and keys are read from
/// the terminal, so it does not interfere with the protocol on stdin/stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptPicker;

impl DirectoryPicker for PromptPicker {
    fn pick_directory(&mut self, start: &Path) -> Option<PathBuf> {
        let suggestion = start.to_string_lossy().into_owned();

        loop {
            let answer = Text::new("Library folder:")
                .with_default(&suggestion)
                .with_help_message("Each subfolder with videos becomes a channel (Esc to cancel)")
                .prompt_skippable();

            let chosen = match answer {
                Ok(Some(input)) => expand_tilde(input.trim()),
                Ok(None) | Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    tracing::debug!("directory selection cancelled");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "directory prompt failed");
                    return None;
                }
            };

            if chosen.is_dir() {
                return Some(chosen);
            }
            tracing::warn!(path = %chosen.display(), "not an existing folder, asking again");
        }
    }
}

/// Always answers with a preset choice.
///
/// For hosts whose display surface has already chosen a folder, and for tests.
#[derive(Debug, Default, Clone)]
pub struct PresetPicker {
    choice: Option<PathBuf>,
}

impl PresetPicker {
    #[must_use]
    pub fn new(choice: Option<PathBuf>) -> Self {
        Self { choice }
    }

    /// A picker that always cancels.
    #[must_use]
    pub fn cancelled() -> Self {
        Self { choice: None }
    }
}

impl DirectoryPicker for PresetPicker {
    fn pick_directory(&mut self, _start: &Path) -> Option<PathBuf> {
        self.choice.clone()
    }
}
