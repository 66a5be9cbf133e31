//! Handle to one live telemetry generation and its aggregated shutdown.

use std::fmt;
use std::time::Duration;

use opentelemetry::global::{self, BoxedTracer};
use opentelemetry::logs::LoggerProvider as ApiLoggerProvider;
use opentelemetry::metrics::Meter;
use opentelemetry_sdk::logs::LoggerProvider;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::TracerProvider;
use tracing::{info, warn};

use crate::config::SignalKind;
use crate::error::{ShutdownError, SignalShutdownError};
use crate::manager;
use crate::metrics;

type TaskError = Box<dyn std::error::Error + Send + Sync>;
type TaskResult = Result<(), TaskError>;

/// Logger handed out by the process-wide default provider.
pub type BoundLogger = <global::GlobalLoggerProvider as ApiLoggerProvider>::Logger;

/// One provider's teardown: final flush, then release of the exporter. Runs
/// at most once; the closure drains the provider's background flush activity
/// before returning.
pub(crate) struct ShutdownTask {
    signal: SignalKind,
    run: Box<dyn FnOnce() -> TaskResult + Send>,
}

impl ShutdownTask {
    pub(crate) fn signal(&self) -> SignalKind {
        self.signal
    }

    pub(crate) fn run(self) -> TaskResult {
        (self.run)()
    }

    pub(crate) fn trace(provider: TracerProvider) -> Self {
        Self {
            signal: SignalKind::Trace,
            run: Box::new(move || {
                let mut failure: Option<TaskError> = None;
                for result in provider.force_flush() {
                    if let Err(e) = result {
                        failure.get_or_insert(Box::new(e));
                    }
                }
                // Swaps the global slot to a no-op provider; the generation's
                // processors are released once the last reference drops here.
                global::shutdown_tracer_provider();
                drop(provider);
                failure.map_or(Ok(()), Err)
            }),
        }
    }

    pub(crate) fn metric(provider: SdkMeterProvider) -> Self {
        Self {
            signal: SignalKind::Metric,
            run: Box::new(move || {
                provider.shutdown().map_err(|e| -> TaskError { Box::new(e) })
            }),
        }
    }

    pub(crate) fn log(provider: LoggerProvider) -> Self {
        Self {
            signal: SignalKind::Log,
            run: Box::new(move || {
                let mut failure: Option<TaskError> = None;
                for result in provider.force_flush() {
                    if let Err(e) = result {
                        failure.get_or_insert(Box::new(e));
                    }
                }
                global::shutdown_logger_provider();
                drop(provider);
                failure.map_or(Ok(()), Err)
            }),
        }
    }
}

/// Live-generation handle returned by [`initialize`](crate::initialize).
///
/// Owns the ordered shutdown aggregate of exactly the providers its
/// `initialize` call created — never a prior generation's. Recording handles
/// are not cached here; the accessors fetch the current process-wide
/// defaults, so call sites that re-bind after a restart always observe the
/// new generation. Handles bound before a restart degrade to no-ops or
/// internally reported errors, they never panic.
pub struct TelemetryHandle {
    service_name: String,
    generation: u64,
    pending: Vec<ShutdownTask>,
}

impl TelemetryHandle {
    pub(crate) fn new(service_name: String, generation: u64, pending: Vec<ShutdownTask>) -> Self {
        Self {
            service_name,
            generation,
            pending,
        }
    }

    /// Monotonic generation number; restarts hand out fresh generations.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once [`shutdown`](TelemetryHandle::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        self.pending.is_empty()
    }

    /// Tracer from the current process-wide default provider.
    pub fn tracer(&self, scope: &'static str) -> BoxedTracer {
        global::tracer(scope)
    }

    /// Meter from the current process-wide default provider.
    pub fn meter(&self, scope: &'static str) -> Meter {
        global::meter(scope)
    }

    /// Logger from the current process-wide default provider.
    pub fn logger(&self, scope: &'static str) -> BoundLogger {
        global::logger_provider().logger(scope)
    }

    /// Shut down every provider of this generation, trace → metric → log.
    ///
    /// Each provider gets `timeout` on a blocking thread; a deadline hit is
    /// reported as a timeout failure for that provider while the remaining
    /// providers still shut down (a timed-out task keeps draining in the
    /// background, it is only no longer awaited). All failures are joined
    /// into one [`ShutdownError`]; `Ok(())` iff every provider succeeded.
    /// A second call is a no-op returning `Ok(())` regardless of the first
    /// call's outcome.
    pub async fn shutdown(&mut self, timeout: Duration) -> Result<(), ShutdownError> {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return Ok(());
        }

        let mut failures: Vec<SignalShutdownError> = Vec::new();
        for task in pending {
            let signal = task.signal();
            let joined =
                tokio::time::timeout(timeout, tokio::task::spawn_blocking(move || task.run()))
                    .await;
            let result_tag = match joined {
                Err(_) => {
                    failures.push(SignalShutdownError::Timeout { signal, timeout });
                    "timeout"
                }
                Ok(Err(_)) => {
                    failures.push(SignalShutdownError::Panicked { signal });
                    "panicked"
                }
                Ok(Ok(Err(source))) => {
                    failures.push(SignalShutdownError::Provider { signal, source });
                    "error"
                }
                Ok(Ok(Ok(()))) => "completed",
            };
            metrics::emit_provider_shutdown(&self.service_name, signal, result_tag);
        }

        manager::release_generation();
        metrics::emit_shutdown(&self.service_name, failures.is_empty());
        info!(
            generation = self.generation,
            clean = failures.is_empty(),
            "telemetry shutdown complete"
        );
        ShutdownError::from_failures(failures).map_or(Ok(()), Err)
    }
}

impl fmt::Debug for TelemetryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetryHandle")
            .field("service_name", &self.service_name)
            .field("generation", &self.generation)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl Drop for TelemetryHandle {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            warn!(
                generation = self.generation,
                "telemetry handle dropped without shutdown; providers leak until process exit"
            );
            self.pending.clear();
            manager::release_generation();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_shows_generation_and_pending_count() {
        let handle = TelemetryHandle::new("svc".to_string(), 3, Vec::new());
        let rendered = format!("{handle:?}");
        assert!(rendered.contains("generation: 3"));
        assert!(rendered.contains("pending: 0"));
    }
}
