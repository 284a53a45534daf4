use crate::model::DecodedMetrics;
use crate::Error;
use prometheus::{Encoder, GaugeVec, IntCounter, IntCounterVec, TextEncoder};

pub const OUTCOME_OK: &str = "ok";
pub const OUTCOME_DECODE_ERROR: &str = "decode_error";
pub const OUTCOME_READ_ERROR: &str = "read_error";
pub const OUTCOME_CONNECT_ERROR: &str = "connect_error";

lazy_static! {
    static ref VALUE_GAUGE: GaugeVec = register_gauge_vec!(
        opts!("solarmax_value", "last value decoded from the inverter",),
        &["metric"],
    )
    .unwrap();
    static ref POLLS_COUNTER: IntCounterVec = register_int_counter_vec!(
        opts!("solarmax_polls_total", "inverter poll cycles by outcome",),
        &["outcome"],
    )
    .unwrap();
    pub static ref EMIT_ERRORS_COUNTER: IntCounter = register_int_counter!(opts!(
        "solarmax_emit_errors_total",
        "metric lines that could not be sent to graphite",
    ))
    .unwrap();
}

/// Feed one decoded response to the Prometheus registry.
pub fn record(decoded: &DecodedMetrics) {
    for (metric, value) in decoded.iter() {
        VALUE_GAUGE.with_label_values(&[metric]).set(value.as_f64());
    }
    record_outcome(OUTCOME_OK);
}

pub fn record_outcome(outcome: &str) {
    POLLS_COUNTER.with_label_values(&[outcome]).inc();
}

/// Read metrics from Prometheus exporter registry.
pub fn read() -> Result<String, Error> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder
        .encode(&metric_families, &mut buffer)
        .or(Err(Error::FormatError))?;
    String::from_utf8(buffer).or(Err(Error::FormatError))
}
