//! Keyword search over persisted videos.
//!
//! Matching is a case-insensitive substring test against each video's name and
//! path. Hits come back in persisted order: channel order first, then position
//! within the channel. There is no ranking.

use serde::{Deserialize, Serialize};

use super::models::{ChannelRecord, VideoRecord};

/// A matching video plus enough channel context to navigate to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub channel_id: i64,
    pub channel_name: String,
    pub channel_path: String,
    pub video: VideoRecord,
}

/// Returns every video in `channels` whose name or path contains `keyword`.
///
/// The keyword is trimmed first; a blank keyword matches nothing.
#[must_use]
pub fn search_channels(channels: &[ChannelRecord], keyword: &str) -> Vec<SearchHit> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    channels
        .iter()
        .flat_map(|channel| {
            channel
                .videos
                .iter()
                .filter(|video| matches(video, &needle))
                .map(move |video| SearchHit {
                    channel_id: channel.id,
                    channel_name: channel.name.clone(),
                    channel_path: channel.path.clone(),
                    video: video.clone(),
                })
        })
        .collect()
}

fn matches(video: &VideoRecord, needle: &str) -> bool {
    video.name.to_lowercase().contains(needle) || video.path.to_lowercase().contains(needle)
}
