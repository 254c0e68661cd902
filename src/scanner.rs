//! Read-only directory scanning for video files and channel folders.
//!
//! Scans never fail from the caller's point of view. A folder that vanished or
//! cannot be read is routine for a media library, so every filesystem error is
//! logged and turned into "nothing found" via [`Scanned`].
//!
//! Both scans look exactly one level deep:
//!
//! ```text
//! root/                  ← list_channels(root)
//! ├── A/                 ← channel "A" (has videos)
//! │   ├── a.mp4          ← list_video_files(root/A)
//! │   └── notes.txt      ← ignored (extension not allowed)
//! ├── B/                 ← skipped (no videos)
//! └── intro.mp4          ← ignored (not a subfolder)
//! ```
//!
//! Results come back in filesystem enumeration order; callers that need a stable
//! order must sort.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use walkdir::{DirEntry, WalkDir};

use crate::domain::{ScannedChannel, Scanned, VideoFile};

/// File extensions recognised as videos, compared case-insensitively.
pub const VIDEO_EXTENSIONS: [&str; 8] = ["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v"];

/// Returns `true` if `path` has an allow-listed video extension.
///
/// # Examples
///
/// ```
/// use vidshelf::scanner::is_video_file;
/// use std::path::Path;
///
/// assert!(is_video_file(Path::new("clip.MP4")));
/// assert!(!is_video_file(Path::new("notes.txt")));
/// assert!(!is_video_file(Path::new("mp4")));
/// ```
#[must_use]
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
}

/// Lists the video files directly inside `dir`.
///
/// Non-recursive. Returns an empty result if `dir` does not exist or is not
/// readable; individual entries whose metadata cannot be read are skipped.
#[tracing::instrument(level = "debug", skip_all, fields(dir = %dir.display()))]
pub fn list_video_files(dir: &Path) -> Scanned<VideoFile> {
    let dir = absolutize(dir);
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "video folder missing or not a directory");
        return Scanned::empty();
    }

    let videos: Scanned<VideoFile> = direct_children(&dir)
        .filter(|entry| entry.file_type().is_file() && is_video_file(entry.path()))
        .filter_map(|entry| video_file_from_entry(&entry))
        .collect();

    tracing::debug!(video_count = videos.len(), "video files listed");
    videos
}

/// Lists the channels under `root`: its immediate subfolders holding at least
/// one video file.
///
/// Returns an empty result if `root` does not exist or is not readable.
#[tracing::instrument(level = "debug", skip_all, fields(root = %root.display()))]
pub fn list_channels(root: &Path) -> Scanned<ScannedChannel> {
    let root = absolutize(root);
    if !root.is_dir() {
        tracing::warn!(root = %root.display(), "library root missing or not a directory");
        return Scanned::empty();
    }

    let channels: Scanned<ScannedChannel> = direct_children(&root)
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| {
            let videos = list_video_files(entry.path()).into_inner();
            if videos.is_empty() {
                tracing::debug!(folder = %entry.path().display(), "skipping folder without videos");
                return None;
            }
            Some(ScannedChannel::new(
                entry.file_name().to_string_lossy().into_owned(),
                entry.path().to_string_lossy().into_owned(),
                videos,
            ))
        })
        .collect();

    tracing::debug!(channel_count = channels.len(), "channels listed");
    channels
}

/// Iterates the entries exactly one level below `dir`, logging and dropping any
/// that cannot be read.
fn direct_children(dir: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
}

fn video_file_from_entry(entry: &DirEntry) -> Option<VideoFile> {
    let metadata = match entry.metadata() {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(path = %entry.path().display(), error = %e, "cannot read file metadata");
            return None;
        }
    };
    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

    Some(VideoFile {
        name: entry.file_name().to_string_lossy().into_owned(),
        path: entry.path().to_string_lossy().into_owned(),
        size: metadata.len(),
        modified: DateTime::<Utc>::from(modified),
    })
}

/// Makes `dir` absolute against the current directory without resolving links.
fn absolutize(dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        return dir.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| dir.to_path_buf(), |cwd| cwd.join(dir))
}
