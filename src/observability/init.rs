//! Tracing subscriber setup.

use super::exporter::file_tracer_provider;
use crate::domain::error::{Result, UserGridError};
use crate::infrastructure::paths;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use std::path::PathBuf;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE_NAME: &str = "usergrid";

/// Installs the global subscriber and returns the trace file path.
///
/// The filter comes from `RUST_LOG` when set, else from `trace_level` in the
/// configuration, else `info`. Spans are exported as OTLP JSON lines to
/// `<data_dir>/usergrid-otlp.json`.
///
/// # Errors
///
/// Returns an error if the data directory cannot be resolved or created, the
/// filter directive is invalid, or a global subscriber is already installed.
pub fn init_tracing(config: &Config) -> Result<PathBuf> {
    let data_dir = paths::resolve_data_dir(config.data_dir.as_deref())?;
    std::fs::create_dir_all(&data_dir)?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.trace_level.as_deref().unwrap_or("info"))
            .map_err(|e| UserGridError::Config(format!("invalid trace_level: {e}")))?,
    };

    let trace_file = paths::trace_file(&data_dir);
    let resource = Resource::new(vec![
        KeyValue::new("service.name", SERVICE_NAME),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    let provider = file_tracer_provider(trace_file.clone(), resource);
    let tracer = provider.tracer(SERVICE_NAME);
    opentelemetry::global::set_tracer_provider(provider);

    tracing_subscriber::registry()
        .with(filter)
        .with(OpenTelemetryLayer::new(tracer))
        .try_init()
        .map_err(|e| UserGridError::Config(format!("tracing already initialized: {e}")))?;

    tracing::debug!(trace_file = ?trace_file, "tracing initialized");
    Ok(trace_file)
}

/// Flushes and stops span export.
pub fn shutdown_tracing() {
    opentelemetry::global::shutdown_tracer_provider();
}
