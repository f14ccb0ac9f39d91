//! OpenTelemetry-based observability with file-based trace export.
//!
//! Spans from `#[tracing::instrument]` and the `*_span!` macros flow through
//! `tracing-opentelemetry` into a file exporter:
//!
//! ```text
//! tracing-opentelemetry → OpenTelemetry SDK → FileSpanExporter → moodlog-otlp.json
//! ```
//!
//! The file lives in the data directory, rotates at 10MB, and keeps 3
//! backups. Each line is one OTLP JSON batch.
//!
//! The level filter is resolved from `RUST_LOG`, then the `trace_level`
//! config key, then `"info"`. Passing `--verbose` to the CLI also prints
//! events to stderr.
//!
//! # Modules
//!
//! - [`init`]: subscriber setup
//! - `export`: OTLP JSON span exporter and tracer provider
//! - `file_writer`: rotating line writer

mod export;
mod file_writer;
pub mod init;

pub use init::{init_tracing, DEFAULT_TRACE_LEVEL};
