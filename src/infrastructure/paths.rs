//! Path resolution for the media library and for vidshelf's own files.
//!
//! Nothing here can fail: when the platform cannot tell us where the home or data
//! directory is, we fall back to the system temp directory so callers always get
//! a usable path.

use std::path::PathBuf;

/// Name of the per-user directory holding the store, config, and traces.
const APP_DIR_NAME: &str = "vidshelf";

/// Host operating system family, as far as media folder conventions go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    /// Any other unix-like system; follows the Linux convention.
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    /// Name of the well-known video folder under the user's home directory.
    #[must_use]
    pub const fn media_folder_name(self) -> &'static str {
        match self {
            Self::MacOs => "Movies",
            Self::Windows | Self::Linux | Self::Other => "Videos",
        }
    }
}

/// Returns the user's home directory, or the temp directory if it is unknown.
#[must_use]
pub fn home_dir_or_fallback() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        tracing::warn!("home directory unknown, falling back to temp directory");
        std::env::temp_dir()
    })
}

/// Returns the default media library root for `platform`.
///
/// `<home>/Videos` on Windows and Linux, `<home>/Movies` on macOS.
///
/// # Examples
///
/// ```
/// use vidshelf::infrastructure::paths::{default_media_root, Platform};
///
/// let root = default_media_root(Platform::MacOs);
/// assert!(root.ends_with("Movies"));
/// ```
#[must_use]
pub fn default_media_root(platform: Platform) -> PathBuf {
    home_dir_or_fallback().join(platform.media_folder_name())
}

/// Returns the data directory for vidshelf storage and traces.
///
/// Resolves to `<data_dir>/vidshelf`, e.g. `~/.local/share/vidshelf` on Linux.
#[must_use]
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

/// Returns the default location of `config.toml`.
#[must_use]
pub fn get_config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join("config.toml")
}

/// Expands a leading `~` to the user's home directory.
///
/// # Examples
///
/// ```
/// use vidshelf::infrastructure::paths::expand_tilde;
///
/// assert_eq!(expand_tilde("/absolute/path"), std::path::PathBuf::from("/absolute/path"));
/// assert!(expand_tilde("~/Videos").ends_with("Videos"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        home_dir_or_fallback()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home_dir_or_fallback().join(rest)
    } else {
        PathBuf::from(path)
    }
}
