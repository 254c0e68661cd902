//! Storage layer for persisted channel metadata, preferences, and search history.
//!
//! # Modules
//!
//! - `backend`: Storage trait abstraction for backend implementations
//! - `json`: JSON file-based storage implementation
//! - `history`: Search history de-duplication and capacity policy
//! - `search`: Keyword matching over persisted videos
//! - `models`: Persisted record types separate from scan results

pub mod backend;
pub mod history;
pub mod json;
pub mod models;
pub mod search;

pub use backend::Storage;
pub use history::DEFAULT_HISTORY_LIMIT;
pub use json::JsonStorage;
pub use models::{ChannelRecord, VideoRecord};
pub use search::SearchHit;

/// Config key under which the last selected library root is stored.
pub const SELECTED_DIRECTORY_KEY: &str = "selected_directory";

/// File name of the library document inside the data directory.
pub const DEFAULT_STORE_FILE: &str = "library.json";
