//! Observability utilities.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::types::ObservabilityConfig;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Initialize tracing subscriber once for the process.
///
/// `RUST_LOG` takes precedence; otherwise the configured level applies.
/// JSON output suits the platform's log ingestion, compact text suits a
/// terminal.
pub fn init_tracing(config: &ObservabilityConfig) {
    TRACING_INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let result = if config.json_logs {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .try_init()
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}
