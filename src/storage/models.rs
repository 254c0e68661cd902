//! Storage record models for persistence layer.
//!
//! These are the shapes written to the JSON document. They are built from
//! [`ChannelInput`] at save time and are separate from the transient scan types
//! in [`crate::domain`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ChannelInput, VideoInput};

/// A persisted video belonging to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// File base name.
    pub name: String,

    /// Absolute file path, unique within its channel.
    pub path: String,

    /// Duration in seconds, 0 when unknown.
    #[serde(default)]
    pub duration: u64,

    /// Size in bytes.
    #[serde(default)]
    pub file_size: u64,

    /// Index of this record in the channel's `videos` at save time.
    pub position_in_channel: usize,
}

impl VideoRecord {
    fn from_input(position: usize, path: String, video: &VideoInput) -> Self {
        Self {
            name: video.name.clone(),
            path,
            duration: video.duration_or_zero(),
            file_size: video.size,
            position_in_channel: position,
        }
    }
}

/// A persisted channel: one subfolder of the library root.
///
/// `video_count` and `total_duration` are derived from `videos` whenever the
/// record is built; nothing updates them independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Surrogate id, assigned at first save and kept across re-saves.
    pub id: i64,

    /// Folder base name.
    pub name: String,

    /// Absolute folder path; the natural key.
    pub path: String,

    pub video_count: usize,

    /// Sum of video durations in seconds.
    pub total_duration: u64,

    /// When this channel was last saved.
    pub last_scan_time: DateTime<Utc>,

    #[serde(default)]
    pub videos: Vec<VideoRecord>,
}

impl ChannelRecord {
    /// Builds the persisted form of `input` under the given id.
    ///
    /// Videos without a path get `<channel path>/<name>`. A path repeated within
    /// the input keeps its first position and the last occurrence's content.
    ///
    /// # Examples
    ///
    /// ```
    /// use vidshelf::domain::{ChannelInput, VideoInput};
    /// use vidshelf::storage::ChannelRecord;
    ///
    /// let input = ChannelInput {
    ///     name: "A".to_string(),
    ///     path: "/lib/A".to_string(),
    ///     videos: vec![
    ///         VideoInput { name: "a.mp4".into(), path: "/lib/A/a.mp4".into(), size: 1000, modified: None, duration: Some(120) },
    ///         VideoInput { name: "b.mp4".into(), path: "/lib/A/b.mp4".into(), size: 500, modified: None, duration: None },
    ///     ],
    /// };
    /// let record = ChannelRecord::from_input(7, &input, chrono::Utc::now());
    /// assert_eq!(record.video_count, 2);
    /// assert_eq!(record.total_duration, 120);
    /// assert_eq!(record.videos[1].position_in_channel, 1);
    /// ```
    #[must_use]
    pub fn from_input(id: i64, input: &ChannelInput, scanned_at: DateTime<Utc>) -> Self {
        let mut videos: Vec<VideoRecord> = Vec::with_capacity(input.videos.len());
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(input.videos.len());

        for video in &input.videos {
            let path = video.path_in(&input.path);
            if let Some(&position) = positions.get(&path) {
                tracing::debug!(path = %path, "repeated video path, keeping first position");
                videos[position] = VideoRecord::from_input(position, path, video);
                continue;
            }
            positions.insert(path.clone(), videos.len());
            videos.push(VideoRecord::from_input(videos.len(), path, video));
        }

        let total_duration = videos
            .iter()
            .map(|video| video.duration)
            .fold(0u64, u64::saturating_add);

        Self {
            id,
            name: input.name.clone(),
            path: input.path.clone(),
            video_count: videos.len(),
            total_duration,
            last_scan_time: scanned_at,
            videos,
        }
    }
}
