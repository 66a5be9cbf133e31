//! Signal providers: wrap an exporter in its batching processor or periodic
//! reader, build the provider, and register it as the process-wide default.
//!
//! Each provider exclusively owns its processor/reader, which exclusively
//! owns its exporter; nothing is shared across generations.

use std::time::Duration;

use opentelemetry::global;
use opentelemetry_sdk::logs::{BatchLogProcessor, LoggerProvider};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::runtime;
use opentelemetry_sdk::trace::{BatchConfig, BatchConfigBuilder, BatchSpanProcessor, TracerProvider};
use opentelemetry_sdk::Resource;

use crate::config::ExporterConfig;
use crate::error::ExporterInitError;
use crate::exporter::{self, LogExporterKind, MetricsExporterKind, SpanExporterKind};

fn span_batch_config(flush_interval: Duration) -> BatchConfig {
    BatchConfigBuilder::default()
        .with_scheduled_delay(flush_interval)
        .build()
}

/// Build the trace chain and register it as the global tracer provider.
pub(crate) fn install_tracer_provider(
    config: &ExporterConfig,
    resource: Resource,
) -> Result<TracerProvider, ExporterInitError> {
    let processor = match exporter::span_exporter(config)? {
        SpanExporterKind::Otlp(exporter) => BatchSpanProcessor::builder(exporter, runtime::Tokio)
            .with_batch_config(span_batch_config(config.flush_interval))
            .build(),
        SpanExporterKind::Stdout(exporter) => BatchSpanProcessor::builder(exporter, runtime::Tokio)
            .with_batch_config(span_batch_config(config.flush_interval))
            .build(),
    };
    let provider = TracerProvider::builder()
        .with_span_processor(processor)
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .build();
    global::set_tracer_provider(provider.clone());
    Ok(provider)
}

/// Build the metric chain and register it as the global meter provider. The
/// periodic reader pulls current instrument values on the configured cadence
/// and pushes them to the exporter.
pub(crate) fn install_meter_provider(
    config: &ExporterConfig,
    resource: Resource,
) -> Result<SdkMeterProvider, ExporterInitError> {
    let reader = match exporter::metrics_exporter(config)? {
        MetricsExporterKind::Otlp(exporter) => PeriodicReader::builder(exporter, runtime::Tokio)
            .with_interval(config.flush_interval)
            .build(),
        MetricsExporterKind::Stdout(exporter) => PeriodicReader::builder(exporter, runtime::Tokio)
            .with_interval(config.flush_interval)
            .build(),
    };
    let provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource)
        .build();
    global::set_meter_provider(provider.clone());
    Ok(provider)
}

/// Build the log chain and register it as the global logger provider. The
/// batch processor keeps the SDK's default flush cadence.
pub(crate) fn install_logger_provider(
    config: &ExporterConfig,
    resource: Resource,
) -> Result<LoggerProvider, ExporterInitError> {
    let processor = match exporter::log_exporter(config)? {
        LogExporterKind::Otlp(exporter) => {
            BatchLogProcessor::builder(exporter, runtime::Tokio).build()
        }
        LogExporterKind::Stdout(exporter) => {
            BatchLogProcessor::builder(exporter, runtime::Tokio).build()
        }
    };
    let provider = LoggerProvider::builder()
        .with_log_processor(processor)
        .with_config(opentelemetry_sdk::logs::Config::default().with_resource(resource))
        .build();
    global::set_logger_provider(provider.clone());
    Ok(provider)
}
