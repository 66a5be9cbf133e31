//! Telemetry pipeline lifecycle: per-signal exporter→processor→provider
//! chains (traces, metrics, logs) over OTLP/HTTP or stdout, registered as
//! the process-wide defaults, with fixed setup ordering, partial-failure
//! unwinding, aggregated shutdown, and timer-driven restart support.

mod config;
mod error;
mod exporter;
mod handle;
mod manager;
mod metrics;
mod provider;

pub use config::{
    Destination, ExporterConfig, FailurePolicy, SignalKind, TelemetryConfig,
    DEFAULT_FLUSH_INTERVAL,
};
pub use error::{ExporterInitError, SetupError, ShutdownError, SignalShutdownError};
pub use handle::{BoundLogger, TelemetryHandle};
pub use manager::initialize;
