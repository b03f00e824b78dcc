//! OpenTelemetry tracing exported to a local file.
//!
//! `tracing` spans are bridged into OpenTelemetry by `tracing-opentelemetry`
//! and written, one OTLP JSON document per line, to a size-rotated file in the
//! data directory.
//!
//! - `init`: subscriber installation and shutdown
//! - `exporter`: the span exporter and tracer provider
//! - `otlp`: OTLP JSON encoding
//! - `rotation`: the rotated output file

mod exporter;
mod init;
mod otlp;
mod rotation;

pub use init::{init_tracing, shutdown_tracing};
