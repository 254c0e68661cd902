//! Tracing initialization and subscriber setup.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::exporter::{self, SCOPE_NAME};
use crate::Config;

/// File name of the OTLP trace output inside the data directory.
pub const TRACE_FILE: &str = "vidshelf-otlp.json";

/// Installs the global tracing subscriber.
///
/// Pipeline: level filter, then OpenTelemetry export to
/// `<data_dir>/vidshelf-otlp.json`, plus human-readable lines on stderr when
/// `log_stderr` is set. Stdout is never written to; it carries the protocol.
///
/// The level comes from `RUST_LOG` if set, else `trace_level`, else `info`.
///
/// Observability is optional: if the data directory cannot be created, only
/// the stderr layer (if enabled) is installed. Calling this twice is harmless;
/// the second subscriber is discarded.
///
/// Returns the tracer provider so the caller can shut it down on exit.
pub fn init_tracing(config: &Config) -> Option<TracerProvider> {
    let level = config.trace_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = config
        .log_stderr
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let data_dir = config.data_dir();
    let provider = std::fs::create_dir_all(&data_dir).ok().map(|()| {
        let resource = Resource::new(vec![
            opentelemetry::KeyValue::new("service.name", SCOPE_NAME),
            opentelemetry::KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]);
        exporter::create_tracer_provider(data_dir.join(TRACE_FILE), resource)
    });

    let otel_layer = provider
        .as_ref()
        .map(|provider| OpenTelemetryLayer::new(provider.tracer(SCOPE_NAME)));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        provider
    } else {
        None
    }
}
