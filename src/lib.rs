//! Vidshelf: a local video library host.
//!
//! Vidshelf serves a display surface (a webview, a TUI, a test harness) that
//! talks to it in line-delimited JSON. It provides:
//! - Discovery of "channels": the immediate subfolders of a library root that
//!   directly contain video files
//! - A single JSON document persisting channels, preferences, and search history
//! - Keyword search across persisted videos
//! - Interactive selection of the library root

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Host binary (main.rs)                              │  ← stdin/stdout
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Worker Layer (worker/)                             │  ← Dispatch
//! │  - Request/response protocol                        │
//! │  - NDJSON bridge                                    │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Scanner       │   │ Storage Layer │   │ Picker        │
//! │ (scanner.rs)  │   │ (storage/)    │   │ (picker.rs)   │
//! │ - Channels    │   │ - JSON I/O    │   │ - Prompt      │
//! │ - Videos      │   │ - Search      │   │ - Preset      │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Platform paths (infrastructure/)                 │
//! │  - Error types and video model (domain/)            │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │
//! │  - OpenTelemetry tracing                            │
//! │  - File-based OTLP export                           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`domain`]: Core domain types (videos, channels, outcomes, errors)
//! - [`infrastructure`]: Platform-specific utilities (paths)
//! - [`scanner`]: Filesystem discovery of videos and channels
//! - [`storage`]: JSON file persistence for channels, config, and history
//! - [`picker`]: Directory selection
//! - [`worker`]: Request dispatch and wire protocol
//! - `observability`: OpenTelemetry tracing (internal)
//!
//! # Configuration
//!
//! Read from `<config dir>/vidshelf/config.toml`, or the file named by
//! `VIDSHELF_CONFIG`. Every key is optional:
//!
//! ```toml
//! data_dir = "~/.local/share/vidshelf"
//! store_file = "library.json"
//! trace_level = "debug"
//! log_stderr = true
//! history_limit = 20
//! ```
//!
//! # Error Model
//!
//! Scans always succeed and answer with a (possibly empty) [`Scanned`] list.
//! Store reads log failures and answer empty. Store writes return
//! [`Persisted`], which the worker reports as `saved` or `failed`.
//!
//! # Examples
//!
//! ```rust
//! use vidshelf::picker::PresetPicker;
//! use vidshelf::worker::{Request, Response};
//! use vidshelf::{initialize, Config};
//!
//! let dir = tempfile::tempdir()?;
//! let config = Config {
//!     data_dir: Some(dir.path().to_string_lossy().into_owned()),
//!     ..Default::default()
//! };
//!
//! let mut worker = initialize(&config, PresetPicker::cancelled());
//! let reply = worker.handle_message(Request::GetChannels);
//! assert_eq!(reply, Response::Channels { channels: vec![] });
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod domain;
pub mod infrastructure;
pub mod picker;
pub mod scanner;
pub mod storage;
pub mod worker;

pub mod observability;

pub use domain::{
    ChannelInput, Persisted, Result, SaveReceipt, Scanned, ScannedChannel, VideoFile, VideoInput,
    VidshelfError,
};
pub use worker::LibraryWorker;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::picker::DirectoryPicker;
use crate::storage::{DEFAULT_HISTORY_LIMIT, DEFAULT_STORE_FILE};

/// Host configuration.
///
/// Loaded from TOML; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the library document and trace output.
    ///
    /// `~` is expanded. Default: the platform data directory joined with
    /// `vidshelf`.
    pub data_dir: Option<String>,

    /// File name of the library document inside `data_dir`. Default: `library.json`
    pub store_file: String,

    /// Tracing level for OpenTelemetry spans.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`. `RUST_LOG` wins when set.
    pub trace_level: Option<String>,

    /// Also print human-readable log lines on stderr.
    pub log_stderr: bool,

    /// Maximum number of remembered search keywords. Default: 20
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            store_file: DEFAULT_STORE_FILE.to_string(),
            trace_level: None,
            log_stderr: false,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    /// Resolved data directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .as_deref()
            .map_or_else(infrastructure::get_data_dir, infrastructure::expand_tilde)
    }

    /// Full path of the library document.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir().join(&self.store_file)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`VidshelfError::Config`] if the text is not valid TOML or a key
    /// has the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| VidshelfError::Config(e.to_string()))
    }

    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| VidshelfError::Config(format!("{}: {e}", path.display())))
    }

    /// Reads `path` if it exists, else returns the defaults.
    ///
    /// A file that exists but cannot be parsed is logged and ignored.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            Self::default()
        })
    }

    /// Builds configuration from a flat string map, e.g. key/value pairs passed
    /// by an embedding host.
    ///
    /// Unparseable numbers and booleans fall back to their defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use vidshelf::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("history_limit".to_string(), "5".to_string());
    /// map.insert("log_stderr".to_string(), "true".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.history_limit, 5);
    /// assert!(config.log_stderr);
    /// ```
    #[must_use]
    pub fn from_map(config: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();

        let store_file = config
            .get("store_file")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.store_file);

        let history_limit = config
            .get("history_limit")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(defaults.history_limit);

        let log_stderr = config
            .get("log_stderr")
            .and_then(|s| s.trim().parse::<bool>().ok())
            .unwrap_or(defaults.log_stderr);

        Self {
            data_dir: config.get("data_dir").cloned(),
            store_file,
            trace_level: config.get("trace_level").cloned(),
            log_stderr,
            history_limit,
        }
    }
}

/// Opens the library store and returns a worker ready to serve requests.
///
/// Never fails: if the store cannot be opened the worker answers reads with
/// empty results and fails every write.
pub fn initialize<P: DirectoryPicker>(config: &Config, picker: P) -> LibraryWorker<P> {
    tracing::debug!(store = %config.store_path().display(), "initializing vidshelf");
    LibraryWorker::open(config, picker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_keys() {
        let config = Config::from_toml_str("trace_level = \"debug\"").unwrap();
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
        assert_eq!(config.store_file, "library.json");
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert!(!config.log_stderr);
    }

    #[test]
    fn wrong_types_are_config_errors() {
        let err = Config::from_toml_str("history_limit = \"many\"").unwrap_err();
        assert!(matches!(err, VidshelfError::Config(_)));
    }

    #[test]
    fn store_path_joins_data_dir() {
        let config = Config {
            data_dir: Some("/srv/vidshelf".to_string()),
            store_file: "shelf.json".to_string(),
            ..Default::default()
        };
        assert_eq!(config.store_path(), PathBuf::from("/srv/vidshelf/shelf.json"));
    }

    #[test]
    fn load_or_default_tolerates_missing_and_broken_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(Config::load_or_default(&missing), Config::default());

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "history_limit = [").unwrap();
        assert_eq!(Config::load_or_default(&broken), Config::default());

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "history_limit = 3\nlog_stderr = true\n").unwrap();
        let config = Config::load_or_default(&good);
        assert_eq!(config.history_limit, 3);
        assert!(config.log_stderr);
    }

    #[test]
    fn from_map_falls_back_on_bad_values() {
        let mut map = BTreeMap::new();
        map.insert("history_limit".to_string(), "lots".to_string());
        map.insert("store_file".to_string(), "  ".to_string());
        map.insert("data_dir".to_string(), "~/shelf".to_string());

        let config = Config::from_map(&map);
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.store_file, DEFAULT_STORE_FILE);
        assert_eq!(config.data_dir.as_deref(), Some("~/shelf"));
        assert!(config.data_dir().ends_with("shelf"));
    }
}
