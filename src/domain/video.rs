//! Video and channel descriptions exchanged with the display surface.
//!
//! [`VideoFile`] and [`ScannedChannel`] are produced fresh by every scan and never
//! persisted as-is. [`ChannelInput`] is what the display surface sends back after
//! the user has filled in durations and ordering; the store turns it into a
//! persisted [`crate::storage::ChannelRecord`].

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// A video file found on disk during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFile {
    /// File base name, including extension.
    pub name: String,

    /// Absolute path of the file.
    pub path: String,

    /// Size in bytes.
    pub size: u64,

    /// Last modification time reported by the filesystem.
    pub modified: DateTime<Utc>,
}

/// A subfolder of the library root that holds at least one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedChannel {
    /// Subfolder base name.
    pub name: String,

    /// Absolute path of the subfolder.
    pub path: String,

    /// Number of entries in `videos`.
    pub video_count: usize,

    /// Videos directly inside the subfolder, in enumeration order.
    pub videos: Vec<VideoFile>,
}

impl ScannedChannel {
    /// Builds a scanned channel, deriving `video_count` from `videos`.
    #[must_use]
    pub fn new(name: String, path: String, videos: Vec<VideoFile>) -> Self {
        Self {
            name,
            path,
            video_count: videos.len(),
            videos,
        }
    }
}

/// One video of a channel save request.
///
/// Mirrors [`VideoFile`] with an optional `duration` added by the display layer.
/// A missing duration counts as zero seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInput {
    pub name: String,

    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,

    /// Duration in seconds, if known. Fractional seconds are rounded down.
    #[serde(
        default,
        deserialize_with = "whole_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<u64>,
}

/// Accepts integer or fractional seconds, as media elements report them.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Option::<f64>::deserialize(deserializer)?
        .map(|seconds| {
            if seconds.is_finite() && seconds >= 0.0 {
                Ok(seconds.floor() as u64)
            } else {
                Err(D::Error::custom(format!("invalid duration: {seconds}")))
            }
        })
        .transpose()
}

impl VideoInput {
    /// Duration in seconds, treating an unknown duration as zero.
    #[must_use]
    pub fn duration_or_zero(&self) -> u64 {
        self.duration.unwrap_or(0)
    }

    /// The file path to persist for this video. An empty `path` is resolved
    /// as `name` inside `channel_path`.
    #[must_use]
    pub fn path_in(&self, channel_path: &str) -> String {
        if self.path.trim().is_empty() {
            Path::new(channel_path)
                .join(&self.name)
                .to_string_lossy()
                .into_owned()
        } else {
            self.path.clone()
        }
    }
}

impl From<VideoFile> for VideoInput {
    fn from(file: VideoFile) -> Self {
        Self {
            name: file.name,
            path: file.path,
            size: file.size,
            modified: Some(file.modified),
            duration: None,
        }
    }
}

/// A channel save request: the channel's identity plus its ordered videos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInput {
    pub name: String,

    /// Absolute folder path; the natural key of the persisted channel.
    pub path: String,

    /// Videos in display order. Index `i` becomes `position_in_channel = i`.
    #[serde(default)]
    pub videos: Vec<VideoInput>,
}

impl ChannelInput {
    /// Sum of video durations, counting unknown durations as zero.
    #[must_use]
    pub fn total_duration(&self) -> u64 {
        self.videos
            .iter()
            .map(VideoInput::duration_or_zero)
            .fold(0u64, u64::saturating_add)
    }
}

impl From<ScannedChannel> for ChannelInput {
    fn from(channel: ScannedChannel) -> Self {
        Self {
            name: channel.name,
            path: channel.path,
            videos: channel.videos.into_iter().map(VideoInput::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, duration: Option<u64>) -> VideoInput {
        VideoInput {
            name: name.to_string(),
            path: format!("/lib/A/{name}"),
            size: 10,
            modified: None,
            duration,
        }
    }

    #[test]
    fn total_duration_treats_missing_as_zero() {
        let channel = ChannelInput {
            name: "A".to_string(),
            path: "/lib/A".to_string(),
            videos: vec![input("a.mp4", Some(120)), input("b.mp4", None), input("c.mp4", Some(30))],
        };
        assert_eq!(channel.total_duration(), 150);
    }

    #[test]
    fn video_input_accepts_minimal_json() {
        let video: VideoInput = serde_json::from_str(r#"{"name":"a.mp4","size":1000,"duration":120}"#)
            .expect("minimal video input should parse");
        assert_eq!(video.path, "");
        assert_eq!(video.duration_or_zero(), 120);
        assert!(video.modified.is_none());
    }

    #[test]
    fn fractional_durations_round_down() {
        let video: VideoInput =
            serde_json::from_str(r#"{"name":"a.mp4","duration":120.9}"#).unwrap();
        assert_eq!(video.duration, Some(120));

        let video: VideoInput = serde_json::from_str(r#"{"name":"a.mp4","duration":null}"#).unwrap();
        assert_eq!(video.duration, None);

        assert!(serde_json::from_str::<VideoInput>(r#"{"name":"a.mp4","duration":-1}"#).is_err());
    }

    #[test]
    fn empty_path_resolves_inside_channel() {
        let mut video = input("a.mp4", None);
        assert_eq!(video.path_in("/elsewhere"), "/lib/A/a.mp4");

        video.path = String::new();
        assert_eq!(video.path_in("/lib/B"), "/lib/B/a.mp4");
    }

    #[test]
    fn scanned_channel_converts_without_durations() {
        let scanned = ScannedChannel::new(
            "A".to_string(),
            "/lib/A".to_string(),
            vec![VideoFile {
                name: "a.mp4".to_string(),
                path: "/lib/A/a.mp4".to_string(),
                size: 1000,
                modified: Utc::now(),
            }],
        );
        assert_eq!(scanned.video_count, 1);

        let channel = ChannelInput::from(scanned);
        assert_eq!(channel.videos.len(), 1);
        assert_eq!(channel.videos[0].duration, None);
        assert_eq!(channel.total_duration(), 0);
    }
}
