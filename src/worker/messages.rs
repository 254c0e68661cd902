//! Request and response protocol between the display surface and the host.
//!
//! Every request names one fixed operation (`op`) and is wrapped in a
//! [`RequestEnvelope`] carrying a caller-chosen id and, optionally, the caller's
//! trace context. The worker answers with a [`ResponseEnvelope`] echoing the id.
//!
//! ```text
//! → {"id":7,"request":{"op":"scan-channels","path":"/lib"}}
//! ← {"id":7,"response":{"kind":"scanned_channels","channels":[...]}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ChannelInput, SaveReceipt, Scanned, ScannedChannel, VideoFile};
use crate::storage::{ChannelRecord, SearchHit};

/// Distributed tracing context for cross-process span propagation.
///
/// Captures the current trace and span IDs from OpenTelemetry so the worker's
/// spans can be linked to the span that issued the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Parent span ID for linking spans across the boundary.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Creates a trace context from the current tracing span.
    ///
    /// Returns `None` if the current span has no valid OpenTelemetry context,
    /// e.g. when tracing was never initialized.
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let otel_context = tracing::Span::current().context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }
}

/// Operations the host exposes across the trust boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Request {
    /// Ask the user for a library root and remember the choice.
    SelectDirectory,

    /// The previously chosen library root, if any.
    GetSavedDirectory,

    /// The platform's default media folder.
    GetVideosPath,

    /// List video files directly inside `path`.
    ScanVideos { path: String },

    /// List the channel subfolders of the library root `path`.
    ScanChannels { path: String },

    /// Insert or replace one channel, keyed by its path.
    SaveChannelData { channel: ChannelInput },

    /// Replace the whole channel list.
    SaveAllChannels { channels: Vec<ChannelInput> },

    /// All persisted channels.
    GetChannels,

    /// Videos whose name or path contains `keyword`, ignoring case.
    SearchVideos { keyword: String },

    GetSearchHistory,

    AddSearchHistory { keyword: String },

    ClearSearchHistory,

    /// Read one preference from the config namespace.
    GetConfig { key: String },

    /// Write one preference into the config namespace.
    SetConfig { key: String, value: Value },
}

impl Request {
    /// Wire name of the operation, for logs and spans.
    #[must_use]
    pub const fn op_name(&self) -> &'static str {
        match self {
            Self::SelectDirectory => "select-directory",
            Self::GetSavedDirectory => "get-saved-directory",
            Self::GetVideosPath => "get-videos-path",
            Self::ScanVideos { .. } => "scan-videos",
            Self::ScanChannels { .. } => "scan-channels",
            Self::SaveChannelData { .. } => "save-channel-data",
            Self::SaveAllChannels { .. } => "save-all-channels",
            Self::GetChannels => "get-channels",
            Self::SearchVideos { .. } => "search-videos",
            Self::GetSearchHistory => "get-search-history",
            Self::AddSearchHistory { .. } => "add-search-history",
            Self::ClearSearchHistory => "clear-search-history",
            Self::GetConfig { .. } => "get-config",
            Self::SetConfig { .. } => "set-config",
        }
    }
}

/// Replies sent back for each [`Request`].
///
/// Scan replies carry [`Scanned`] lists and have no failure form. Writes reply
/// with [`Response::Saved`] (or another success variant) or [`Response::Failed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
    /// A library root; `None` when cancelled or never chosen.
    Directory { path: Option<String> },

    VideosPath { path: String },

    Videos { videos: Scanned<VideoFile> },

    ScannedChannels { channels: Scanned<ScannedChannel> },

    /// A channel write succeeded.
    Saved { success: bool, receipt: SaveReceipt },

    Channels { channels: Vec<ChannelRecord> },

    SearchResults { keyword: String, hits: Vec<SearchHit> },

    /// The search history after the operation, most recent first.
    SearchHistory { keywords: Vec<String> },

    ConfigValue { key: String, value: Option<Value> },

    /// A write with nothing to report succeeded.
    Ack,

    /// The operation failed; nothing was changed.
    Failed { success: bool, message: String },
}

impl Response {
    #[must_use]
    pub const fn saved(receipt: SaveReceipt) -> Self {
        Self::Saved {
            success: true,
            receipt,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            success: false,
            message: message.into(),
        }
    }

    /// Returns `true` unless this is a [`Response::Failed`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// A request as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Caller-chosen id, echoed in the response.
    pub id: u64,

    pub request: Request,

    /// Trace context for linking spans across the boundary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_context: Option<TraceContext>,
}

impl RequestEnvelope {
    /// Wraps `request`, attaching the current trace context if there is one.
    #[must_use]
    pub fn new(id: u64, request: Request) -> Self {
        Self {
            id,
            request,
            trace_context: TraceContext::from_current(),
        }
    }
}

/// A response as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: u64,
    pub response: Response,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_use_kebab_case_operation_names() {
        let envelope: RequestEnvelope =
            serde_json::from_str(r#"{"id":3,"request":{"op":"scan-channels","path":"/lib"}}"#).unwrap();
        assert_eq!(envelope.id, 3);
        assert_eq!(envelope.request, Request::ScanChannels { path: "/lib".to_string() });
        assert_eq!(envelope.request.op_name(), "scan-channels");
        assert!(envelope.trace_context.is_none());

        let unit: Request = serde_json::from_str(r#"{"op":"clear-search-history"}"#).unwrap();
        assert_eq!(unit, Request::ClearSearchHistory);
    }

    #[test]
    fn save_request_accepts_display_layer_shape() {
        let request: Request = serde_json::from_str(
            r#"{"op":"save-channel-data","channel":{"name":"A","path":"/lib/A",
                "videos":[{"name":"a.mp4","size":1000,"duration":120}]}}"#,
        )
        .unwrap();

        match request {
            Request::SaveChannelData { channel } => {
                assert_eq!(channel.videos.len(), 1);
                assert_eq!(channel.total_duration(), 120);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn failure_and_success_shapes() {
        let failed = serde_json::to_value(Response::failed("disk full")).unwrap();
        assert_eq!(failed["kind"], "failed");
        assert_eq!(failed["success"], false);
        assert_eq!(failed["message"], "disk full");

        let saved = Response::saved(SaveReceipt {
            channels_written: 1,
            channel_id: Some(42),
            video_count: Some(2),
            total_duration: Some(150),
        });
        assert!(saved.is_success());
        let saved = serde_json::to_value(saved).unwrap();
        assert_eq!(saved["success"], true);
        assert_eq!(saved["receipt"]["channel_id"], 42);
    }

    #[test]
    fn scanned_lists_serialize_as_plain_arrays() {
        let response = Response::Videos { videos: Scanned::empty() };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"kind":"videos","videos":[]}"#
        );
    }

    #[test]
    fn envelope_without_tracing_has_no_context() {
        let envelope = RequestEnvelope::new(1, Request::GetChannels);
        assert!(envelope.trace_context.is_none());
        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"id":1,"request":{"op":"get-channels"}}"#
        );
    }
}
