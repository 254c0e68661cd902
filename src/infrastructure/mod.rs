//! Infrastructure layer for filesystem and environment interactions.
//!
//! Platform-specific path conventions: where the user's videos live, and where
//! vidshelf keeps its store, configuration and traces.

pub mod paths;

pub use paths::{default_media_root, expand_tilde, get_config_file, get_data_dir, Platform};
