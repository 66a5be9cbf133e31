//! End-to-end lifecycle tests over the stdout pipelines.
//!
//! The providers register as process-wide defaults, so every test takes the
//! same lock and the file runs effectively serially even under the default
//! parallel test harness.

use std::sync::Mutex;
use std::time::Duration;

use common_telemetry::{
    initialize, ExporterConfig, SetupError, SignalKind, TelemetryConfig,
};
use opentelemetry::trace::{Span as _, Tracer as _};

static SEQUENTIAL: Mutex<()> = Mutex::new(());

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

fn stdout_config() -> TelemetryConfig {
    TelemetryConfig::new("lifecycle-test")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn initialize_then_shutdown_is_clean() {
    let _guard = SEQUENTIAL.lock().unwrap_or_else(|e| e.into_inner());

    let mut telemetry = initialize(&stdout_config()).expect("initialize");
    assert!(!telemetry.is_shut_down());

    telemetry
        .shutdown(SHUTDOWN_TIMEOUT)
        .await
        .expect("clean shutdown");
    assert!(telemetry.is_shut_down());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_shutdown_is_a_noop() {
    let _guard = SEQUENTIAL.lock().unwrap_or_else(|e| e.into_inner());

    let mut telemetry = initialize(&stdout_config()).expect("initialize");
    telemetry
        .shutdown(SHUTDOWN_TIMEOUT)
        .await
        .expect("first shutdown");
    telemetry
        .shutdown(SHUTDOWN_TIMEOUT)
        .await
        .expect("second shutdown must be a no-op");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn double_initialize_is_rejected() {
    let _guard = SEQUENTIAL.lock().unwrap_or_else(|e| e.into_inner());

    let mut telemetry = initialize(&stdout_config()).expect("first initialize");
    let second = initialize(&stdout_config());
    assert!(matches!(second, Err(SetupError::AlreadyInitialized)));

    // The rejection must not have disturbed the live generation.
    telemetry
        .shutdown(SHUTDOWN_TIMEOUT)
        .await
        .expect("original generation still shuts down cleanly");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn metric_failure_unwinds_and_leaves_a_clean_slate() {
    let _guard = SEQUENTIAL.lock().unwrap_or_else(|e| e.into_inner());

    let config = stdout_config()
        .with_metric(ExporterConfig::otlp_http("not a valid endpoint"));
    let err = initialize(&config).expect_err("metric pipeline must fail to assemble");
    match err {
        SetupError::Provider { signal, .. } => assert_eq!(signal, SignalKind::Metric),
        other => panic!("unexpected setup error: {other}"),
    }

    // The failed call unwound its partial generation, so a fresh
    // initialize must succeed immediately.
    let mut telemetry = initialize(&stdout_config()).expect("initialize after failed setup");
    telemetry
        .shutdown(SHUTDOWN_TIMEOUT)
        .await
        .expect("clean shutdown after recovery");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn restart_hands_out_a_fresh_generation() {
    let _guard = SEQUENTIAL.lock().unwrap_or_else(|e| e.into_inner());

    let mut first = initialize(&stdout_config()).expect("first initialize");
    let first_generation = first.generation();
    let stale_tracer = first.tracer("lifecycle-test");
    let stale_counter = first
        .meter("lifecycle-test")
        .u64_counter("stale.counter")
        .init();

    first.shutdown(SHUTDOWN_TIMEOUT).await.expect("shutdown");

    let mut second = initialize(&stdout_config()).expect("restart");
    assert!(second.generation() > first_generation);

    // Handles bound to the previous generation degrade to no-ops.
    let mut span = stale_tracer.start("stale-span");
    span.set_attribute(opentelemetry::KeyValue::new("stale", true));
    span.end();
    stale_counter.add(1, &[]);

    second
        .shutdown(SHUTDOWN_TIMEOUT)
        .await
        .expect("second generation shuts down cleanly");
}
