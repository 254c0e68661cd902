//! OpenTelemetry-based observability with file-based trace export.
//!
//! ```text
//! tracing → tracing-opentelemetry → OpenTelemetry SDK → FileSpanExporter → JSON lines
//!         ↘ fmt layer → stderr (optional)
//! ```
//!
//! - **File-Based Export**: traces go to `<data_dir>/vidshelf-otlp.json`
//! - **Automatic Rotation**: the file rotates at 10MB, keeping 3 numbered backups
//! - **OTLP Format**: one OTLP/JSON `resourceSpans` document per line
//!
//! Request spans can be joined to a caller's trace through the
//! [`TraceContext`](crate::worker::TraceContext) carried on request envelopes.
//!
//! # Usage
//!
//! ```rust,no_run
//! use vidshelf::observability::init_tracing;
//! use vidshelf::Config;
//!
//! let provider = init_tracing(&Config::default());
//! tracing::info!("host started");
//! if let Some(provider) = provider {
//!     let _ = provider.shutdown();
//! }
//! ```

mod exporter;
mod init;
mod otlp;
mod rotating;

pub use init::{init_tracing, TRACE_FILE};
