//! Typed configuration for the three signal pipelines.

use std::str::FromStr;
use std::time::Duration;

/// Default flush cadence for the batch processors and the periodic metric
/// reader.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(2);

/// One of the three telemetry signal categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalKind {
    Trace,
    Metric,
    Log,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Trace => "trace",
            SignalKind::Metric => "metric",
            SignalKind::Log => "log",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a signal's exporter delivers its batches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// OTLP over plaintext HTTP to a collector base URL (no TLS); the
    /// exporter appends the per-signal path (`/v1/traces` etc.) itself.
    OtlpHttp { endpoint: String },
    /// Pretty-printed records on standard output, one batch per export.
    Stdout,
}

/// Exporter settings for a single signal. Immutable once constructed.
#[derive(Clone, Debug)]
pub struct ExporterConfig {
    pub destination: Destination,
    pub flush_interval: Duration,
}

impl ExporterConfig {
    pub fn otlp_http(endpoint: impl Into<String>) -> Self {
        Self {
            destination: Destination::OtlpHttp {
                endpoint: endpoint.into(),
            },
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }

    pub fn stdout() -> Self {
        Self {
            destination: Destination::Stdout,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }

    /// Batch flush / periodic collection cadence for this signal.
    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }
}

/// How [`initialize`](crate::initialize) surfaces a pipeline construction
/// failure. Applied uniformly to all three signals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Unwind the providers already built by the failing call, then abort
    /// the process.
    Fatal,
    /// Unwind the providers already built by the failing call and return
    /// the error to the caller.
    #[default]
    Recoverable,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_ref() {
            "fatal" => Ok(FailurePolicy::Fatal),
            "recoverable" => Ok(FailurePolicy::Recoverable),
            _ => Err(format!("Unknown failure policy: {s}")),
        }
    }
}

/// Full pipeline configuration: one exporter per signal plus the shared
/// service identity and setup failure policy.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub trace: ExporterConfig,
    pub metric: ExporterConfig,
    pub log: ExporterConfig,
    pub failure_policy: FailurePolicy,
}

impl TelemetryConfig {
    /// All three signals on the stdout fallback with default cadence.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            trace: ExporterConfig::stdout(),
            metric: ExporterConfig::stdout(),
            log: ExporterConfig::stdout(),
            failure_policy: FailurePolicy::default(),
        }
    }

    /// All three signals to the same OTLP/HTTP collector endpoint.
    pub fn otlp_http(service_name: impl Into<String>, endpoint: &str) -> Self {
        Self {
            service_name: service_name.into(),
            trace: ExporterConfig::otlp_http(endpoint),
            metric: ExporterConfig::otlp_http(endpoint),
            log: ExporterConfig::otlp_http(endpoint),
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn with_trace(mut self, trace: ExporterConfig) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_metric(mut self, metric: ExporterConfig) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_log(mut self, log: ExporterConfig) -> Self {
        self.log = log;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Same flush cadence for all three signals.
    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.trace.flush_interval = flush_interval;
        self.metric.flush_interval = flush_interval;
        self.log.flush_interval = flush_interval;
        self
    }
}
