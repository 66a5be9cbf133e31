//! Instrumentation call site: records one dice roll as a span, a counter
//! increment and a log record, all carrying the same attribute.

use anyhow::Context as _;
use common_telemetry::{BoundLogger, TelemetryHandle};
use opentelemetry::global::BoxedTracer;
use opentelemetry::logs::{AnyValue, LogRecordBuilder, Logger, Severity};
use opentelemetry::metrics::{Counter, Unit};
use opentelemetry::trace::{TraceContextExt, Tracer};
use opentelemetry::KeyValue;

/// Instrumentation scope shared by all three signals.
pub const SCOPE: &str = "dice-roll";

/// The simulated roll outcome; constant by design.
pub const ROLL_VALUE: i64 = 8;

const ROLL_ATTRIBUTE: &str = "roll.value";

/// Recording handles bound to the current provider generation.
///
/// Bind once after every `initialize`: handles bound before a restart point
/// at the previous, already shut-down generation and record nothing.
pub struct Roller {
    tracer: BoxedTracer,
    logger: BoundLogger,
    roll_counter: Counter<u64>,
}

impl Roller {
    /// Fetch tracer/meter/logger from the current process-wide defaults and
    /// create the roll counter.
    pub fn bind(telemetry: &TelemetryHandle) -> anyhow::Result<Self> {
        let meter = telemetry.meter(SCOPE);
        let roll_counter = meter
            .u64_counter("dice.rolls")
            .with_description("Number of dice rolls")
            .with_unit(Unit::new("{roll}"))
            .try_init()
            .context("failed to create dice.rolls counter")?;

        Ok(Self {
            tracer: telemetry.tracer(SCOPE),
            logger: telemetry.logger(SCOPE),
            roll_counter,
        })
    }

    /// Record one roll. The span stays active until the counter increment
    /// and the log record are both issued, and all three carry the same
    /// `roll.value` attribute.
    pub fn roll(&self) {
        self.tracer.in_span("roll", |cx| {
            let attribute = KeyValue::new(ROLL_ATTRIBUTE, ROLL_VALUE);
            cx.span().set_attribute(attribute.clone());

            self.roll_counter.add(1, &[attribute]);

            self.logger.emit(
                LogRecordBuilder::new()
                    .with_severity_number(Severity::Info)
                    .with_severity_text("INFO")
                    .with_body(AnyValue::String("dice rolled".into()))
                    .with_attributes(vec![(ROLL_ATTRIBUTE.into(), AnyValue::Int(ROLL_VALUE))])
                    .with_span_context(cx.span().span_context())
                    .build(),
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use common_telemetry::{initialize, TelemetryConfig};
    use opentelemetry::{Key, Value};

    use super::*;

    #[test]
    fn roll_attribute_is_identical_across_signals() {
        let span_and_counter = KeyValue::new(ROLL_ATTRIBUTE, ROLL_VALUE);
        let (log_key, log_value): (Key, AnyValue) =
            (ROLL_ATTRIBUTE.into(), AnyValue::Int(ROLL_VALUE));

        assert_eq!(span_and_counter.key, log_key);
        assert_eq!(span_and_counter.value, Value::I64(ROLL_VALUE));
        assert_eq!(log_value, AnyValue::Int(ROLL_VALUE));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn roller_records_through_live_pipelines() {
        let mut telemetry =
            initialize(&TelemetryConfig::new("roll-test")).expect("initialize");
        let roller = Roller::bind(&telemetry).expect("bind roller");

        roller.roll();
        roller.roll();

        telemetry
            .shutdown(Duration::from_secs(10))
            .await
            .expect("clean shutdown flushes the recorded rolls");
    }
}
