//! JSON file-based storage backend.
//!
//! The whole library lives in one human-readable JSON document. Every change is
//! applied to a copy of the in-memory document, the copy is written to a
//! temporary file and renamed over the real one, and only then does the copy
//! replace the in-memory state. A failed write therefore leaves both the file and
//! the in-memory state exactly as they were.
//!
//! # Performance Characteristics
//!
//! - **Read**: served from memory; the file is read once on open
//! - **Write**: O(n) - serializes and writes the entire document
//! - **Channel lookup**: O(1) via a path index rebuilt after each write
//! - **Best for**: personal libraries, a few thousand videos

use crate::domain::error::{Result, VidshelfError};
use crate::domain::{ChannelInput, Persisted, SaveReceipt};
use crate::storage::backend::Storage;
use crate::storage::history::{record_keyword, DEFAULT_HISTORY_LIMIT};
use crate::storage::models::ChannelRecord;
use crate::storage::search::{search_channels, SearchHit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Current on-disk format version.
const STORAGE_VERSION: u32 = 1;

const fn storage_version() -> u32 {
    STORAGE_VERSION
}

/// JSON storage container format.
///
/// Top-level keys this crate does not know about are kept in `extra` and written
/// back unchanged, so a rewrite never drops data put there by another tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageData {
    #[serde(default = "storage_version")]
    version: u32,

    /// Persisted channels in insertion/upsert order.
    #[serde(default)]
    channels: Vec<ChannelRecord>,

    /// User preferences, e.g. the selected library root.
    #[serde(default)]
    config: Map<String, Value>,

    /// Searched keywords, most recent first.
    #[serde(default)]
    search_history: Vec<String>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: STORAGE_VERSION,
            channels: Vec::new(),
            config: Map::new(),
            search_history: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// JSON file storage backend.
///
/// # Thread Safety
///
/// This type is `Send` but not `Sync`. It is owned by the single request worker,
/// which makes every read-modify-write a single-writer operation.
///
/// # File Format
///
/// ```json
/// {
///   "version": 1,
///   "channels": [
///     {
///       "id": 1718000000000,
///       "name": "A",
///       "path": "/lib/A",
///       "video_count": 1,
///       "total_duration": 120,
///       "last_scan_time": "2024-06-10T06:13:20Z",
///       "videos": [
///         { "name": "a.mp4", "path": "/lib/A/a.mp4", "duration": 120,
///           "file_size": 1000, "position_in_channel": 0 }
///       ]
///     }
///   ],
///   "config": { "selected_directory": "/lib" },
///   "search_history": ["cat", "dog"]
/// }
/// ```
pub struct JsonStorage {
    /// Path to the JSON file on disk.
    file_path: PathBuf,

    /// In-memory copy of the document, always equal to the last successful write.
    data: StorageData,

    /// Channel path → index into `data.channels`.
    index: HashMap<String, usize>,

    /// Maximum number of search history entries.
    history_limit: usize,

    /// Set when the in-memory document has never been written (new file or
    /// migrated format).
    dirty: bool,
}

impl JsonStorage {
    /// Creates or opens a JSON storage backend.
    ///
    /// If the file exists, loads existing data. Otherwise starts from an empty
    /// document that is written on the first change or on [`Storage::flush`].
    /// Parent directories are created automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - File exists but contains invalid JSON
    /// - File permissions prevent reading
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON storage");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let (data, dirty) = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("initializing new empty storage");
            (StorageData::default(), true)
        };

        tracing::debug!(
            channel_count = data.channels.len(),
            history_count = data.search_history.len(),
            "storage initialized"
        );

        Ok(Self {
            index: Self::build_index(&data.channels),
            file_path,
            data,
            history_limit: DEFAULT_HISTORY_LIMIT,
            dirty,
        })
    }

    /// Sets the maximum number of search history entries kept.
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Path of the backing JSON file.
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Flushes pending state and closes the store.
    ///
    /// # Errors
    ///
    /// Returns an error if pending state cannot be written. The store is
    /// consumed either way.
    pub fn close(mut self) -> Result<()> {
        let result = self.flush();
        tracing::debug!(success = result.is_ok(), "storage closed");
        result
    }

    /// Loads storage data from a JSON file, reporting whether it needs rewriting.
    fn load_from_file(path: &Path) -> Result<(StorageData, bool)> {
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            tracing::debug!("storage file is empty, starting fresh");
            return Ok((StorageData::default(), true));
        }

        let mut data: StorageData = serde_json::from_str(&contents)
            .map_err(|e| VidshelfError::Storage(format!("failed to parse JSON: {e}")))?;

        let migrated = data.version < STORAGE_VERSION;
        if migrated {
            tracing::info!(from = data.version, to = STORAGE_VERSION, "upgrading storage format");
            data.version = STORAGE_VERSION;
        } else if data.version > STORAGE_VERSION {
            tracing::warn!(version = data.version, "storage written by a newer version");
        }

        tracing::debug!(
            version = data.version,
            channels = data.channels.len(),
            unknown_keys = data.extra.len(),
            "loaded storage data"
        );

        Ok((data, migrated))
    }

    /// Writes `data` to `path` via a temporary file and rename.
    fn write_atomically(path: &Path, data: &StorageData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| VidshelfError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = Self::temp_path(path);
        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");

        let written = std::fs::write(&tmp_path, json).and_then(|()| std::fs::rename(&tmp_path, path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(VidshelfError::Storage(format!(
                "failed to write {}: {e}",
                path.display()
            )));
        }

        tracing::debug!("storage saved successfully");
        Ok(())
    }

    /// Sibling file the next document is written to before the rename:
    /// `<file name>.tmp`, never the store file itself.
    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Applies `change` to a copy of the document, persists the copy, and only
    /// then makes it the current state.
    fn commit<T>(&mut self, change: impl FnOnce(&mut StorageData) -> T) -> Result<T> {
        let mut next = self.data.clone();
        let output = change(&mut next);

        Self::write_atomically(&self.file_path, &next)?;

        self.index = Self::build_index(&next.channels);
        self.data = next;
        self.dirty = false;
        Ok(output)
    }

    fn build_index(channels: &[ChannelRecord]) -> HashMap<String, usize> {
        let mut index = HashMap::with_capacity(channels.len());
        for (position, channel) in channels.iter().enumerate() {
            index.entry(channel.path.clone()).or_insert(position);
        }
        index
    }

    /// Mints a channel id: the current time in milliseconds, bumped above every
    /// id in `taken` so ids stay unique even within one millisecond.
    fn mint_channel_id(taken: impl Iterator<Item = i64>, now: DateTime<Utc>) -> i64 {
        let floor = taken.max().map_or(i64::MIN, |max| max.saturating_add(1));
        now.timestamp_millis().max(floor)
    }
}

impl Storage for JsonStorage {
    fn upsert_channel(&mut self, channel: &ChannelInput) -> Persisted {
        let _span = tracing::debug_span!("json_upsert_channel",
            channel_path = %channel.path,
            video_count = channel.videos.len()
        ).entered();

        let existing = self.index.get(&channel.path).copied();
        let now = Utc::now();

        let record = self.commit(|data| {
            match existing.and_then(|position| data.channels.get_mut(position)) {
                Some(slot) => {
                    tracing::debug!(channel_id = slot.id, "replacing existing channel");
                    *slot = ChannelRecord::from_input(slot.id, channel, now);
                    slot.clone()
                }
                None => {
                    let id = Self::mint_channel_id(data.channels.iter().map(|c| c.id), now);
                    tracing::debug!(channel_id = id, "appending new channel");
                    let record = ChannelRecord::from_input(id, channel, now);
                    data.channels.push(record.clone());
                    record
                }
            }
        })?;

        tracing::debug!(
            channel_id = record.id,
            total_duration = record.total_duration,
            "channel saved"
        );
        Ok(SaveReceipt {
            channels_written: 1,
            channel_id: Some(record.id),
            video_count: Some(record.video_count),
            total_duration: Some(record.total_duration),
        })
    }

    fn replace_all_channels(&mut self, channels: &[ChannelInput]) -> Persisted {
        let _span = tracing::debug_span!("json_replace_all_channels",
            count = channels.len()
        ).entered();

        let now = Utc::now();

        let written = self.commit(|data| {
            let previous: HashMap<String, i64> = data
                .channels
                .iter()
                .map(|c| (c.path.clone(), c.id))
                .collect();

            let mut next: Vec<ChannelRecord> = Vec::with_capacity(channels.len());
            let mut positions: HashMap<&str, usize> = HashMap::with_capacity(channels.len());

            for input in channels {
                if let Some(&position) = positions.get(input.path.as_str()) {
                    let id = next[position].id;
                    next[position] = ChannelRecord::from_input(id, input, now);
                    continue;
                }

                let id = previous.get(&input.path).copied().unwrap_or_else(|| {
                    Self::mint_channel_id(
                        previous.values().copied().chain(next.iter().map(|c| c.id)),
                        now,
                    )
                });
                positions.insert(input.path.as_str(), next.len());
                next.push(ChannelRecord::from_input(id, input, now));
            }

            let dropped = data.channels.len().saturating_sub(
                data.channels.iter().filter(|c| positions.contains_key(c.path.as_str())).count(),
            );
            tracing::debug!(kept = next.len(), dropped = dropped, "channel list replaced");

            let written = next.len();
            data.channels = next;
            written
        })?;

        Ok(SaveReceipt {
            channels_written: written,
            channel_id: None,
            video_count: None,
            total_duration: None,
        })
    }

    fn list_channels(&self) -> Result<Vec<ChannelRecord>> {
        let _span = tracing::debug_span!("json_list_channels").entered();

        let channels = self.data.channels.clone();

        tracing::debug!(count = channels.len(), "retrieved channels");
        Ok(channels)
    }

    fn get_channel(&self, path: &str) -> Result<Option<ChannelRecord>> {
        let channel = self
            .index
            .get(path)
            .and_then(|&position| self.data.channels.get(position))
            .cloned();

        tracing::debug!(path = %path, found = channel.is_some(), "channel lookup complete");
        Ok(channel)
    }

    fn search_videos(&self, keyword: &str) -> Result<Vec<SearchHit>> {
        let _span = tracing::debug_span!("json_search_videos", keyword = %keyword).entered();

        let hits = search_channels(&self.data.channels, keyword);

        tracing::debug!(hit_count = hits.len(), "search complete");
        Ok(hits)
    }

    fn get_config(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.data.config.get(key).cloned())
    }

    fn set_config(&mut self, key: &str, value: Value) -> Result<()> {
        let _span = tracing::debug_span!("json_set_config", key = %key).entered();

        self.commit(|data| {
            data.config.insert(key.to_string(), value);
        })
    }

    fn search_history(&self) -> Result<Vec<String>> {
        Ok(self.data.search_history.clone())
    }

    fn add_search_history(&mut self, keyword: &str) -> Result<Vec<String>> {
        let _span = tracing::debug_span!("json_add_search_history", keyword = %keyword).entered();

        if keyword.trim().is_empty() {
            tracing::debug!("ignoring blank keyword");
            return Ok(self.data.search_history.clone());
        }

        let limit = self.history_limit;
        self.commit(|data| {
            record_keyword(&mut data.search_history, keyword, limit);
            data.search_history.clone()
        })
    }

    fn clear_search_history(&mut self) -> Result<()> {
        let _span = tracing::debug_span!("json_clear_search_history").entered();

        self.commit(|data| data.search_history.clear())
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            tracing::trace!("skipping flush, no pending changes");
            return Ok(());
        }

        Self::write_atomically(&self.file_path, &self.data)?;
        self.dirty = false;
        Ok(())
    }
}

impl Drop for JsonStorage {
    /// Writes a never-persisted document on drop if nobody called `close`.
    fn drop(&mut self) {
        if self.dirty {
            tracing::debug!("saving pending data on drop");
            if let Err(e) = self.flush() {
                tracing::error!(error = %e, "failed to save on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VideoInput;
    use tempfile::TempDir;

    fn video(name: &str, size: u64, duration: Option<u64>) -> VideoInput {
        VideoInput {
            name: name.to_string(),
            path: format!("/lib/A/{name}"),
            size,
            modified: None,
            duration,
        }
    }

    fn channel(name: &str, videos: Vec<VideoInput>) -> ChannelInput {
        ChannelInput {
            name: name.to_string(),
            path: format!("/lib/{name}"),
            videos,
        }
    }

    fn open(dir: &TempDir) -> JsonStorage {
        JsonStorage::new(dir.path().join("library.json")).unwrap()
    }

    #[test]
    fn fresh_store_is_empty_and_flushes_a_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("library.json");
        let store = JsonStorage::new(path.clone()).unwrap();

        assert!(store.list_channels().unwrap().is_empty());
        assert!(!path.exists());

        store.close().unwrap();
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["version"], 1);
        assert_eq!(written["channels"], serde_json::json!([]));
    }

    #[test]
    fn resaving_a_path_keeps_id_and_recomputes_totals() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);

        let first = store
            .upsert_channel(&channel("A", vec![video("a.mp4", 1000, Some(120))]))
            .unwrap();
        let second = store
            .upsert_channel(&channel(
                "A",
                vec![video("a.mp4", 1000, Some(120)), video("a2.mp4", 500, Some(30))],
            ))
            .unwrap();

        assert_eq!(first.channel_id, second.channel_id);
        let channels = store.list_channels().unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].video_count, 2);
        assert_eq!(channels[0].total_duration, 150);
        assert_eq!(Some(channels[0].id), first.channel_id);
    }

    #[test]
    fn identical_saves_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        let input = channel("A", vec![video("a.mp4", 1000, Some(60)), video("b.mp4", 10, None)]);

        let first = store.upsert_channel(&input).unwrap();
        let second = store.upsert_channel(&input).unwrap();

        assert_eq!(first.channel_id, second.channel_id);
        assert_eq!(second.video_count, Some(2));
        assert_eq!(second.total_duration, Some(60));
        assert_eq!(store.list_channels().unwrap().len(), 1);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);

        store.upsert_channel(&channel("A", vec![video("a.mp4", 1, None)])).unwrap();
        store.upsert_channel(&channel("B", vec![video("b.mp4", 1, None)])).unwrap();
        store.upsert_channel(&channel("C", vec![video("c.mp4", 1, None)])).unwrap();
        store
            .upsert_channel(&channel("B", vec![video("b.mp4", 1, Some(9)), video("b2.mp4", 1, Some(1))]))
            .unwrap();

        let channels = store.list_channels().unwrap();
        let names: Vec<&str> = channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(channels[1].total_duration, 10);
    }

    #[test]
    fn positions_follow_input_order() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);

        store
            .upsert_channel(&channel(
                "A",
                vec![video("z.mp4", 1, None), video("a.mp4", 1, None), video("m.mp4", 1, None)],
            ))
            .unwrap();

        let record = store.get_channel("/lib/A").unwrap().unwrap();
        for (i, video) in record.videos.iter().enumerate() {
            assert_eq!(video.position_in_channel, i);
        }
        assert_eq!(record.videos[0].name, "z.mp4");
        assert_eq!(record.videos[1].duration, 0);
    }

    #[test]
    fn new_channels_get_distinct_increasing_ids() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);

        let ids: Vec<i64> = ["A", "B", "C", "D"]
            .iter()
            .map(|name| {
                store
                    .upsert_channel(&channel(name, vec![video("x.mp4", 1, None)]))
                    .unwrap()
                    .channel_id
                    .unwrap()
            })
            .collect();

        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let id = {
            let mut store = open(&dir);
            store.upsert_channel(&channel("A", vec![video("a.mp4", 1000, Some(120))])).unwrap();
            store.upsert_channel(&channel("B", vec![video("b.mp4", 10, None)])).unwrap();
            store.set_config("selected_directory", Value::from("/lib")).unwrap();
            store.add_search_history("cat").unwrap();
            store.get_channel("/lib/A").unwrap().unwrap().id
        };

        let mut store = open(&dir);
        let channels = store.list_channels().unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].id, id);
        assert_eq!(store.get_config("selected_directory").unwrap(), Some(Value::from("/lib")));
        assert_eq!(store.search_history().unwrap(), vec!["cat"]);

        let receipt = store.upsert_channel(&channel("A", vec![])).unwrap();
        assert_eq!(receipt.channel_id, Some(id));
        assert_eq!(receipt.video_count, Some(0));
    }

    #[test]
    fn failed_write_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        let mut store = JsonStorage::new(path.clone()).unwrap();
        store.upsert_channel(&channel("A", vec![video("a.mp4", 1, Some(5))])).unwrap();

        // A non-empty directory in place of the file makes the rename fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("blocker"), b"x").unwrap();

        let result = store.upsert_channel(&channel("B", vec![video("b.mp4", 1, None)]));
        assert!(matches!(result, Err(VidshelfError::Storage(_))));

        let channels = store.list_channels().unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].name, "A");
        assert!(store.get_channel("/lib/B").unwrap().is_none());
        assert!(!path.with_extension("tmp").exists());

        assert!(store.set_config("k", Value::from(1)).is_err());
        assert_eq!(store.get_config("k").unwrap(), None);
    }

    #[test]
    fn unknown_top_level_keys_survive_rewrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(
            &path,
            r#"{"version":1,"channels":[],"window":{"width":800},"config":{"theme":"dark"}}"#,
        )
        .unwrap();

        let mut store = JsonStorage::new(path.clone()).unwrap();
        store.upsert_channel(&channel("A", vec![video("a.mp4", 1, None)])).unwrap();
        store.set_config("selected_directory", Value::from("/lib")).unwrap();
        drop(store);

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["window"]["width"], 800);
        assert_eq!(written["config"]["theme"], "dark");
        assert_eq!(written["config"]["selected_directory"], "/lib");
        assert_eq!(written["channels"][0]["name"], "A");
    }

    #[test]
    fn invalid_json_is_an_open_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(JsonStorage::new(path), Err(VidshelfError::Storage(_))));
    }

    #[test]
    fn empty_file_opens_as_fresh_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, "").unwrap();

        let store = JsonStorage::new(path).unwrap();
        assert!(store.list_channels().unwrap().is_empty());
    }

    #[test]
    fn replace_all_keeps_known_ids_and_input_order() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        let a = store.upsert_channel(&channel("A", vec![video("a.mp4", 1, None)])).unwrap();
        store.upsert_channel(&channel("B", vec![video("b.mp4", 1, None)])).unwrap();

        let receipt = store
            .replace_all_channels(&[
                channel("C", vec![video("c.mp4", 1, Some(3))]),
                channel("A", vec![video("a.mp4", 1, Some(7))]),
            ])
            .unwrap();
        assert_eq!(receipt.channels_written, 2);

        let channels = store.list_channels().unwrap();
        let names: Vec<&str> = channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A"]);
        assert_eq!(Some(channels[1].id), a.channel_id);
        assert_ne!(channels[0].id, channels[1].id);
        assert!(store.get_channel("/lib/B").unwrap().is_none());
        assert_eq!(store.get_channel("/lib/A").unwrap().unwrap().total_duration, 7);
    }

    #[test]
    fn replace_all_collapses_repeated_paths() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);

        store
            .replace_all_channels(&[
                channel("A", vec![video("a.mp4", 1, Some(1))]),
                channel("B", vec![video("b.mp4", 1, None)]),
                channel("A", vec![video("a.mp4", 1, Some(2)), video("a2.mp4", 1, Some(2))]),
            ])
            .unwrap();

        let channels = store.list_channels().unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].name, "A");
        assert_eq!(channels[0].total_duration, 4);
    }

    #[test]
    fn search_history_round() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir).with_history_limit(2);

        store.add_search_history("cat").unwrap();
        store.add_search_history("dog").unwrap();
        let history = store.add_search_history("CAT").unwrap();
        assert_eq!(history, vec!["CAT", "dog"]);

        let history = store.add_search_history("fish").unwrap();
        assert_eq!(history, vec!["fish", "CAT"]);

        assert_eq!(store.add_search_history("  ").unwrap(), vec!["fish", "CAT"]);

        store.clear_search_history().unwrap();
        assert!(store.search_history().unwrap().is_empty());
    }

    #[test]
    fn search_reads_persisted_videos() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        store
            .upsert_channel(&channel("A", vec![video("Cat.mp4", 1, None), video("dog.mp4", 1, None)]))
            .unwrap();

        let hits = store.search_videos("cat").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].channel_name, "A");
        assert_eq!(hits[0].video.name, "Cat.mp4");
    }

    #[test]
    fn videos_sent_without_paths_get_unique_paths() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        let input: ChannelInput = serde_json::from_str(
            r#"{"name":"A","path":"/lib/A","videos":[
                {"name":"a.mp4","size":1000,"duration":120},
                {"name":"a2.mp4","size":500,"duration":30}]}"#,
        )
        .unwrap();

        let receipt = store.upsert_channel(&input).unwrap();
        assert_eq!(receipt.video_count, Some(2));
        assert_eq!(receipt.total_duration, Some(150));

        let record = store.get_channel("/lib/A").unwrap().unwrap();
        let paths: Vec<&str> = record.videos.iter().map(|v| v.path.as_str()).collect();
        let expected_a = Path::new("/lib/A").join("a.mp4");
        let expected_a2 = Path::new("/lib/A").join("a2.mp4");
        assert_eq!(paths, vec![expected_a.to_str().unwrap(), expected_a2.to_str().unwrap()]);
    }

    #[test]
    fn repeated_video_paths_collapse_to_first_position() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);

        let receipt = store
            .upsert_channel(&channel(
                "A",
                vec![
                    video("a.mp4", 1, Some(10)),
                    video("b.mp4", 1, Some(20)),
                    video("a.mp4", 2, Some(40)),
                ],
            ))
            .unwrap();
        assert_eq!(receipt.video_count, Some(2));
        assert_eq!(receipt.total_duration, Some(60));

        let record = store.get_channel("/lib/A").unwrap().unwrap();
        assert_eq!(record.videos[0].name, "a.mp4");
        assert_eq!(record.videos[0].file_size, 2);
        assert_eq!(record.videos[0].duration, 40);
        assert_eq!(record.videos[1].name, "b.mp4");
        assert_eq!(record.videos[1].position_in_channel, 1);
    }

    #[test]
    fn temp_file_never_aliases_the_store() {
        assert_eq!(
            JsonStorage::temp_path(Path::new("/data/library.tmp")),
            PathBuf::from("/data/library.tmp.tmp")
        );

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.tmp");
        let mut store = JsonStorage::new(path.clone()).unwrap();
        store.add_search_history("cat").unwrap();
        drop(store);

        assert!(!dir.path().join("library.tmp.tmp").exists());
        let reopened = JsonStorage::new(path).unwrap();
        assert_eq!(reopened.search_history().unwrap(), vec!["cat".to_string()]);
    }
}
