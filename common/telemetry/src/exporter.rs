//! Exporter factory: one concrete exporter per signal, for either the
//! OTLP/HTTP or the stdout destination family.

use std::time::Duration;

use opentelemetry_otlp::{HttpExporterBuilder, WithExportConfig};
use opentelemetry_sdk::metrics::reader::{DefaultAggregationSelector, DefaultTemporalitySelector};

use crate::config::{Destination, ExporterConfig, SignalKind};
use crate::error::ExporterInitError;

/// Per-request timeout for the OTLP/HTTP client.
const EXPORT_TIMEOUT: Duration = Duration::from_secs(3);

pub(crate) enum SpanExporterKind {
    Otlp(opentelemetry_otlp::SpanExporter),
    Stdout(opentelemetry_stdout::SpanExporter),
}

pub(crate) enum MetricsExporterKind {
    Otlp(opentelemetry_otlp::MetricsExporter),
    Stdout(opentelemetry_stdout::MetricsExporter),
}

pub(crate) enum LogExporterKind {
    Otlp(opentelemetry_otlp::LogExporter),
    Stdout(opentelemetry_stdout::LogExporter),
}

fn otlp_http(endpoint: &str) -> HttpExporterBuilder {
    opentelemetry_otlp::new_exporter()
        .http()
        .with_endpoint(endpoint)
        .with_timeout(EXPORT_TIMEOUT)
}

/// Span exporter for the configured destination. Construction performs no
/// network I/O; delivery starts with the first export.
pub(crate) fn span_exporter(
    config: &ExporterConfig,
) -> Result<SpanExporterKind, ExporterInitError> {
    match &config.destination {
        Destination::OtlpHttp { endpoint } => otlp_http(endpoint)
            .build_span_exporter()
            .map(SpanExporterKind::Otlp)
            .map_err(|e| ExporterInitError::new(SignalKind::Trace, e)),
        Destination::Stdout => Ok(SpanExporterKind::Stdout(
            opentelemetry_stdout::SpanExporter::default(),
        )),
    }
}

/// Push-style metrics exporter with the SDK's default aggregation and
/// temporality.
pub(crate) fn metrics_exporter(
    config: &ExporterConfig,
) -> Result<MetricsExporterKind, ExporterInitError> {
    match &config.destination {
        Destination::OtlpHttp { endpoint } => otlp_http(endpoint)
            .build_metrics_exporter(
                Box::new(DefaultAggregationSelector::new()),
                Box::new(DefaultTemporalitySelector::new()),
            )
            .map(MetricsExporterKind::Otlp)
            .map_err(|e| ExporterInitError::new(SignalKind::Metric, e)),
        Destination::Stdout => Ok(MetricsExporterKind::Stdout(
            opentelemetry_stdout::MetricsExporter::default(),
        )),
    }
}

pub(crate) fn log_exporter(config: &ExporterConfig) -> Result<LogExporterKind, ExporterInitError> {
    match &config.destination {
        Destination::OtlpHttp { endpoint } => otlp_http(endpoint)
            .build_log_exporter()
            .map(LogExporterKind::Otlp)
            .map_err(|e| ExporterInitError::new(SignalKind::Log, e)),
        Destination::Stdout => Ok(LogExporterKind::Stdout(
            opentelemetry_stdout::LogExporter::default(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_endpoint_fails_construction() {
        let config = ExporterConfig::otlp_http("not a valid endpoint");
        let err = span_exporter(&config).err().expect("bad endpoint");
        assert_eq!(err.signal, SignalKind::Trace);
    }

    #[test]
    fn stdout_exporters_always_construct() {
        let config = ExporterConfig::stdout();
        assert!(span_exporter(&config).is_ok());
        assert!(metrics_exporter(&config).is_ok());
        assert!(log_exporter(&config).is_ok());
    }
}
