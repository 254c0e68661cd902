//! Request worker: dispatches protocol requests to the scanner, store, and picker.
//!
//! The worker owns the store handle, so every request runs against it one at a
//! time. It enforces the two error policies of the host:
//!
//! - scans and store reads never fail; errors are logged and an empty answer
//!   is returned
//! - store writes report failure as [`Response::Failed`]

use std::path::PathBuf;

use serde_json::Value;

use crate::domain::error::{Result, VidshelfError};
use crate::domain::Persisted;
use crate::infrastructure::paths::{self, Platform};
use crate::picker::DirectoryPicker;
use crate::scanner;
use crate::storage::backend::Storage;
use crate::storage::{JsonStorage, SELECTED_DIRECTORY_KEY};
use crate::worker::{Request, RequestEnvelope, Response, ResponseEnvelope, TraceContext};
use crate::Config;

/// Serves protocol requests against one store and one directory picker.
pub struct LibraryWorker<P> {
    /// Store handle; `None` when it could not be opened at startup.
    storage: Option<Box<dyn Storage>>,

    /// Why the store is unavailable, reported on every write.
    storage_error: Option<String>,

    picker: P,

    /// Platform used to resolve the default media folder.
    platform: Platform,
}

impl<P: DirectoryPicker> LibraryWorker<P> {
    /// Creates a worker around an already opened store.
    pub fn new(storage: Box<dyn Storage>, picker: P) -> Self {
        Self {
            storage: Some(storage),
            storage_error: None,
            picker,
            platform: Platform::current(),
        }
    }

    /// Opens the JSON store described by `config` and wraps it in a worker.
    ///
    /// If the store cannot be opened the worker still starts: reads answer with
    /// empty results and every write fails with the open error.
    pub fn open(config: &Config, picker: P) -> Self {
        let path = config.store_path();
        match JsonStorage::new(path.clone()) {
            Ok(storage) => {
                tracing::info!(path = %path.display(), "library store opened");
                Self::new(Box::new(storage.with_history_limit(config.history_limit)), picker)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to open library store");
                Self {
                    storage: None,
                    storage_error: Some(format!("failed to open {}: {e}", path.display())),
                    picker,
                    platform: Platform::current(),
                }
            }
        }
    }

    /// Overrides the platform used for `get-videos-path`.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Flushes and releases the store. Call once when the host shuts down.
    ///
    /// # Errors
    ///
    /// Returns an error if pending store state cannot be written.
    pub fn shutdown(mut self) -> Result<()> {
        match self.storage.take() {
            Some(mut storage) => {
                let result = storage.flush();
                tracing::info!(success = result.is_ok(), "library store closed");
                result
            }
            None => Ok(()),
        }
    }

    fn get_storage(&self) -> Result<&dyn Storage> {
        self.storage.as_deref().ok_or_else(|| self.unavailable())
    }

    fn get_storage_mut(&mut self) -> Result<&mut Box<dyn Storage>> {
        let error = &self.storage_error;
        self.storage.as_mut().ok_or_else(|| {
            VidshelfError::Worker(
                error
                    .clone()
                    .unwrap_or_else(|| "storage not initialized".to_string()),
            )
        })
    }

    fn unavailable(&self) -> VidshelfError {
        VidshelfError::Worker(
            self.storage_error
                .clone()
                .unwrap_or_else(|| "storage not initialized".to_string()),
        )
    }

    /// Swallow-and-log policy for store reads.
    fn read_or_default<T: Default>(operation: &str, result: Result<T>) -> T {
        result.unwrap_or_else(|e| {
            tracing::warn!(operation = operation, error = %e, "store read failed, answering empty");
            T::default()
        })
    }

    /// Propagate policy for store writes.
    fn handle_write<T, F>(operation: &str, result: Result<T>, on_success: F) -> Response
    where
        F: FnOnce(T) -> Response,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation = operation, "storage operation successful");
                on_success(value)
            }
            Err(e) => {
                tracing::error!(operation = operation, error = %e, "storage operation failed");
                Response::failed(format!("{operation}: {e}"))
            }
        }
    }

    fn handle_persisted(operation: &str, result: Persisted) -> Response {
        Self::handle_write(operation, result, Response::saved)
    }

    fn saved_directory(&self) -> Option<String> {
        let value = Self::read_or_default(
            "get saved directory",
            self.get_storage()
                .and_then(|storage| storage.get_config(SELECTED_DIRECTORY_KEY)),
        );
        value.and_then(|v| v.as_str().map(ToString::to_string))
    }

    fn handle_select_directory(&mut self) -> Response {
        let start = self
            .saved_directory()
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir())
            .unwrap_or_else(|| paths::default_media_root(self.platform));

        let Some(chosen) = self.picker.pick_directory(&start) else {
            return Response::Directory { path: None };
        };
        let chosen = chosen.to_string_lossy().into_owned();
        tracing::info!(directory = %chosen, "library root selected");

        let value = Value::from(chosen.clone());
        Self::handle_write(
            "remember selected directory",
            self.get_storage_mut()
                .and_then(|storage| storage.set_config(SELECTED_DIRECTORY_KEY, value)),
            |()| Response::Directory { path: Some(chosen) },
        )
    }

    fn handle_scan_videos(path: &str) -> Response {
        Response::Videos {
            videos: scanner::list_video_files(&paths::expand_tilde(path)),
        }
    }

    fn handle_scan_channels(path: &str) -> Response {
        Response::ScannedChannels {
            channels: scanner::list_channels(&paths::expand_tilde(path)),
        }
    }

    fn handle_search_videos(&self, keyword: String) -> Response {
        let hits = Self::read_or_default(
            "search videos",
            self.get_storage().and_then(|storage| storage.search_videos(&keyword)),
        );
        Response::SearchResults { keyword, hits }
    }

    /// Attaches the caller's trace context to the current thread.
    ///
    /// Returns a guard that must be held for the duration of the request.
    fn attach_parent_trace_context(
        trace_context: Option<&TraceContext>,
    ) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{
            SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
        };

        let trace_context = trace_context?;
        let trace_id = TraceId::from_hex(&trace_context.trace_id).ok()?;
        let span_id = SpanId::from_hex(&trace_context.parent_span_id).ok()?;

        let span_context = SpanContext::new(
            trace_id,
            span_id,
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );

        Some(opentelemetry::Context::current().with_remote_span_context(span_context).attach())
    }

    /// Processes one request and returns its response.
    pub fn handle_message(&mut self, request: Request) -> Response {
        let span = tracing::debug_span!("worker_handle_message", op = request.op_name());
        let _guard = span.entered();

        match request {
            Request::SelectDirectory => self.handle_select_directory(),

            Request::GetSavedDirectory => Response::Directory {
                path: self.saved_directory(),
            },

            Request::GetVideosPath => Response::VideosPath {
                path: paths::default_media_root(self.platform)
                    .to_string_lossy()
                    .into_owned(),
            },

            Request::ScanVideos { path } => Self::handle_scan_videos(&path),

            Request::ScanChannels { path } => Self::handle_scan_channels(&path),

            Request::SaveChannelData { channel } => Self::handle_persisted(
                "save channel",
                self.get_storage_mut()
                    .and_then(|storage| storage.upsert_channel(&channel)),
            ),

            Request::SaveAllChannels { channels } => Self::handle_persisted(
                "save all channels",
                self.get_storage_mut()
                    .and_then(|storage| storage.replace_all_channels(&channels)),
            ),

            Request::GetChannels => Response::Channels {
                channels: Self::read_or_default(
                    "get channels",
                    self.get_storage().and_then(|storage| storage.list_channels()),
                ),
            },

            Request::SearchVideos { keyword } => self.handle_search_videos(keyword),

            Request::GetSearchHistory => Response::SearchHistory {
                keywords: Self::read_or_default(
                    "get search history",
                    self.get_storage().and_then(|storage| storage.search_history()),
                ),
            },

            Request::AddSearchHistory { keyword } => Self::handle_write(
                "add search history",
                self.get_storage_mut()
                    .and_then(|storage| storage.add_search_history(&keyword)),
                |keywords| Response::SearchHistory { keywords },
            ),

            Request::ClearSearchHistory => Self::handle_write(
                "clear search history",
                self.get_storage_mut()
                    .and_then(|storage| storage.clear_search_history()),
                |()| Response::SearchHistory { keywords: Vec::new() },
            ),

            Request::GetConfig { key } => {
                let value = Self::read_or_default(
                    "get config",
                    self.get_storage().and_then(|storage| storage.get_config(&key)),
                );
                Response::ConfigValue { key, value }
            }

            Request::SetConfig { key, value } => Self::handle_write(
                "set config",
                self.get_storage_mut()
                    .and_then(|storage| storage.set_config(&key, value)),
                |()| Response::Ack,
            ),
        }
    }

    /// Processes a request envelope, joining the caller's trace if one is attached.
    pub fn handle_envelope(&mut self, envelope: RequestEnvelope) -> ResponseEnvelope {
        let _context_guard = Self::attach_parent_trace_context(envelope.trace_context.as_ref());

        ResponseEnvelope {
            id: envelope.id,
            response: self.handle_message(envelope.request),
        }
    }

    /// Decodes one JSON request line and returns the encoded response line.
    ///
    /// Undecodable lines get a `failed` response carrying the request id when
    /// one can be recovered, else id 0.
    pub fn handle_line(&mut self, line: &str) -> String {
        let response = match Self::decode(line) {
            Ok(envelope) => self.handle_envelope(envelope),
            Err((id, e)) => {
                tracing::warn!(id = id, error = %e, "failed to decode request");
                ResponseEnvelope {
                    id,
                    response: Response::failed(format!("invalid request: {e}")),
                }
            }
        };

        serde_json::to_string(&response).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to encode response");
            format!(
                r#"{{"id":{},"response":{{"kind":"failed","success":false,"message":"response encoding failed"}}}}"#,
                response.id
            )
        })
    }

    fn decode(line: &str) -> std::result::Result<RequestEnvelope, (u64, VidshelfError)> {
        let raw: Value = serde_json::from_str(line).map_err(|e| (0, e.into()))?;
        let id = raw.get("id").and_then(Value::as_u64).unwrap_or(0);
        serde_json::from_value(raw).map_err(|e| (id, e.into()))
    }
}

impl<P> std::fmt::Debug for LibraryWorker<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryWorker")
            .field("storage_open", &self.storage.is_some())
            .field("storage_error", &self.storage_error)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}
