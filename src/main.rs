//! Vidshelf host binary.
//!
//! Reads request envelopes from stdin, one JSON document per line, and writes
//! one response line per request to stdout. Logs and traces never touch
//! stdout.
//!
//! # Lifecycle
//!
//! 1. **Load**: read `VIDSHELF_CONFIG` or `<config dir>/vidshelf/config.toml`
//! 2. **Trace**: install the tracing subscriber
//! 3. **Open**: open the library store (a failure is reported per write)
//! 4. **Serve**: answer requests until stdin closes
//! 5. **Shutdown**: flush the store and the tracer provider

#![allow(clippy::multiple_crate_versions)]

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use vidshelf::infrastructure::get_config_file;
use vidshelf::observability::init_tracing;
use vidshelf::picker::PromptPicker;
use vidshelf::worker::serve;
use vidshelf::{initialize, Config};

fn config_path() -> PathBuf {
    std::env::var_os("VIDSHELF_CONFIG").map_or_else(get_config_file, PathBuf::from)
}

fn main() -> ExitCode {
    let config = Config::load_or_default(&config_path());
    let provider = init_tracing(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        store = %config.store_path().display(),
        "vidshelf starting"
    );

    let mut worker = initialize(&config, PromptPicker);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let served = serve(&mut worker, stdin.lock(), stdout.lock());

    let mut code = ExitCode::SUCCESS;
    match served {
        Ok(count) => tracing::info!(requests = count, "input closed, shutting down"),
        Err(e) => {
            tracing::error!(error = %e, "transport failed");
            code = ExitCode::FAILURE;
        }
    }

    if let Err(e) = worker.shutdown() {
        tracing::error!(error = %e, "failed to flush library store");
        code = ExitCode::FAILURE;
    }

    if let Some(provider) = provider {
        if let Err(e) = provider.shutdown() {
            eprintln!("vidshelf: failed to shut down tracing: {e}");
        }
    }

    code
}
