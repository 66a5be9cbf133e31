use crate::config::SignalKind;

pub(crate) const METRIC_INITIALIZE: &str = "telemetry_lifecycle_initialize_total";
pub(crate) const METRIC_SHUTDOWN: &str = "telemetry_lifecycle_shutdown_total";
pub(crate) const METRIC_PROVIDER_SHUTDOWN: &str = "telemetry_provider_shutdown_total";

pub(crate) fn emit_initialize(service_name: &str, result: &str) {
    metrics::counter!(
        METRIC_INITIALIZE,
        "service_name" => service_name.to_string(),
        "result" => result.to_string()
    )
    .increment(1);
}

pub(crate) fn emit_shutdown(service_name: &str, clean: bool) {
    metrics::counter!(
        METRIC_SHUTDOWN,
        "service_name" => service_name.to_string(),
        "clean" => clean.to_string()
    )
    .increment(1);
}

pub(crate) fn emit_provider_shutdown(service_name: &str, signal: SignalKind, result: &str) {
    metrics::counter!(
        METRIC_PROVIDER_SHUTDOWN,
        "service_name" => service_name.to_string(),
        "signal" => signal.as_str(),
        "result" => result.to_string()
    )
    .increment(1);
}
