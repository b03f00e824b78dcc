//! Span exporter writing OTLP JSON lines to a rotated file.

use super::otlp::OtlpJsonEncoder;
use super::rotation::RotatingFile;
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct JsonLinesExporter {
    file: RotatingFile,
    encoder: OtlpJsonEncoder,
    is_shutdown: AtomicBool,
}

impl JsonLinesExporter {
    #[must_use]
    pub const fn new(file: RotatingFile, resource: Resource) -> Self {
        Self { file, encoder: OtlpJsonEncoder::new(resource), is_shutdown: AtomicBool::new(false) }
    }

    fn write_batch(&self, batch: &[SpanData]) -> ExportResult {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Err(TraceError::from("exporter is shut down"));
        }
        let document = self.encoder.encode(batch);
        self.file
            .append_line(&document.to_string())
            .map_err(|e| TraceError::from(e.to_string()))
    }
}

impl SpanExporter for JsonLinesExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = self.write_batch(&batch);
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.encoder.set_resource(resource);
    }
}

/// A provider exporting every finished span to `path` as soon as it ends.
#[must_use]
pub fn file_tracer_provider(path: PathBuf, resource: Resource) -> TracerProvider {
    let exporter = JsonLinesExporter::new(RotatingFile::new(path), resource.clone());

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}
