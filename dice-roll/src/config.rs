use std::time::Duration;

use common_telemetry::{ExporterConfig, FailurePolicy, TelemetryConfig};
use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(default = "dice-roll")]
    pub otel_service_name: String,

    /// OTLP/HTTP collector base URL (plaintext); unset falls back to the
    /// stdout exporters.
    pub otel_url: Option<String>,

    #[envconfig(default = "2")]
    pub otel_flush_interval_secs: u64,

    #[envconfig(default = "recoverable")]
    pub setup_failure_policy: FailurePolicy,

    #[envconfig(default = "2")]
    pub tick_interval_secs: u64,

    #[envconfig(default = "5")]
    pub shutdown_timeout_secs: u64,
}

impl Config {
    pub fn telemetry_config(&self) -> TelemetryConfig {
        let exporter = match &self.otel_url {
            Some(url) => ExporterConfig::otlp_http(url.clone()),
            None => ExporterConfig::stdout(),
        }
        .with_flush_interval(Duration::from_secs(self.otel_flush_interval_secs));

        TelemetryConfig::new(self.otel_service_name.clone())
            .with_trace(exporter.clone())
            .with_metric(exporter.clone())
            .with_log(exporter)
            .with_failure_policy(self.setup_failure_policy)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
