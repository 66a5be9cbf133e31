//! Lifecycle manager: builds the three signal chains in a fixed order,
//! registers them as the process-wide defaults, and hands back a
//! [`TelemetryHandle`] owning their aggregated shutdown.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use opentelemetry::global;
use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry::KeyValue;
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};
use opentelemetry_sdk::Resource;
use tracing::{error, info, warn};

use crate::config::{FailurePolicy, TelemetryConfig};
use crate::error::{ExporterInitError, SetupError};
use crate::handle::{ShutdownTask, TelemetryHandle};
use crate::metrics;
use crate::provider;

/// One live generation at a time; `initialize` refuses to stack a second
/// generation on top of a running one, which would leak the previous
/// generation's providers without capturing their shutdowns.
static LIVE: AtomicBool = AtomicBool::new(false);

/// Monotonic generation counter across restarts.
static GENERATION: AtomicU64 = AtomicU64::new(0);

pub(crate) fn release_generation() {
    LIVE.store(false, Ordering::SeqCst);
}

/// Build and register all three signal pipelines.
///
/// Must run inside a multi-threaded Tokio runtime: the batch processors and
/// the periodic reader spawn their background flush tasks on it, and the
/// failure path drains them from the calling thread. Ordering is fixed:
/// propagator first, then the trace → metric → log chains, each registered
/// as the process-wide default immediately after construction. On a
/// construction failure the providers already built by this call are shut
/// down before the failure surfaces, so a failed `initialize` never leaks a
/// partial generation.
pub fn initialize(config: &TelemetryConfig) -> Result<TelemetryHandle, SetupError> {
    if LIVE.swap(true, Ordering::SeqCst) {
        metrics::emit_initialize(&config.service_name, "already_initialized");
        return Err(SetupError::AlreadyInitialized);
    }
    let generation = GENERATION.fetch_add(1, Ordering::SeqCst) + 1;

    // Safe to repeat on every restart.
    global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ]));

    let resource = Resource::new(vec![KeyValue::new(
        "service.name",
        config.service_name.clone(),
    )]);

    let mut pending: Vec<ShutdownTask> = Vec::with_capacity(3);

    let tracer_provider = match provider::install_tracer_provider(&config.trace, resource.clone())
    {
        Ok(provider) => provider,
        Err(err) => return Err(fail_setup(config, pending, err)),
    };
    pending.push(ShutdownTask::trace(tracer_provider));

    let meter_provider = match provider::install_meter_provider(&config.metric, resource.clone()) {
        Ok(provider) => provider,
        Err(err) => return Err(fail_setup(config, pending, err)),
    };
    pending.push(ShutdownTask::metric(meter_provider));

    let logger_provider = match provider::install_logger_provider(&config.log, resource) {
        Ok(provider) => provider,
        Err(err) => return Err(fail_setup(config, pending, err)),
    };
    pending.push(ShutdownTask::log(logger_provider));

    metrics::emit_initialize(&config.service_name, "ok");
    info!(generation, "telemetry pipelines initialized");
    Ok(TelemetryHandle::new(
        config.service_name.clone(),
        generation,
        pending,
    ))
}

/// Unwind the aggregate collected so far, release the generation slot, then
/// surface the failure per the configured policy.
fn fail_setup(
    config: &TelemetryConfig,
    pending: Vec<ShutdownTask>,
    err: ExporterInitError,
) -> SetupError {
    let signal = err.signal;
    unwind(&config.service_name, pending);
    release_generation();
    metrics::emit_initialize(&config.service_name, "error");
    match config.failure_policy {
        FailurePolicy::Recoverable => SetupError::Provider {
            signal,
            source: err,
        },
        FailurePolicy::Fatal => {
            error!(%signal, error = %err, "telemetry setup failed, aborting");
            panic!("telemetry setup failed for {signal} pipeline: {err}");
        }
    }
}

/// Shut down partially-built providers in creation order. Runs
/// synchronously on the caller's thread; unwind failures are logged, the
/// setup error takes precedence.
fn unwind(service_name: &str, pending: Vec<ShutdownTask>) {
    for task in pending {
        let signal = task.signal();
        match task.run() {
            Ok(()) => metrics::emit_provider_shutdown(service_name, signal, "unwound"),
            Err(e) => {
                metrics::emit_provider_shutdown(service_name, signal, "unwind_error");
                warn!(%signal, error = %e, "failed to unwind partially built provider");
            }
        }
    }
}
