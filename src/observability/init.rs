//! Subscriber setup: level filter, OpenTelemetry file export, optional stderr.

use std::path::Path;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::export::{self, SCOPE_NAME};
use crate::infrastructure::paths::TRACE_FILENAME;
use crate::Config;

/// Level used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_TRACE_LEVEL: &str = "info";

/// Installs the global subscriber.
///
/// Spans are exported to `<data_dir>/moodlog-otlp.json`. With `verbose`, log
/// events are also printed to stderr.
///
/// The filter comes from `RUST_LOG` if set, then `config.trace_level`, then
/// [`DEFAULT_TRACE_LEVEL`]. Tracing is optional: if the data directory cannot
/// be created only the stderr layer is installed, and a second call is a
/// no-op.
///
/// # Example
///
/// ```rust
/// use moodlog::observability::init_tracing;
/// use moodlog::Config;
///
/// let dir = tempfile::tempdir().unwrap();
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config, dir.path(), false);
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config, data_dir: &Path, verbose: bool) {
    let level = config
        .trace_level
        .clone()
        .unwrap_or_else(|| DEFAULT_TRACE_LEVEL.to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let otel_layer = std::fs::create_dir_all(data_dir).ok().map(|()| {
        let resource = Resource::new(vec![
            KeyValue::new("service.name", SCOPE_NAME),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]);
        let provider = export::file_tracer_provider(data_dir.join(TRACE_FILENAME), resource);
        OpenTelemetryLayer::new(provider.tracer(SCOPE_NAME))
    });

    let stderr_layer = verbose.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(stderr_layer)
        .try_init();
}
