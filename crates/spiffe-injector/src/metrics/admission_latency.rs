use lazy_static::lazy_static;
use opentelemetry::{KeyValue, metrics::Histogram};
use std::time::Duration;

use super::AdmissionOutcome;

lazy_static! {
    static ref ADMISSION_LATENCY: Histogram<u64> =
        opentelemetry::global::meter(super::METER_NAME)
            .u64_histogram("spiffe_injector_admission_latency_milliseconds")
            .build();
}

pub fn record_admission_latency(latency: Duration, outcome: &AdmissionOutcome) {
    let millis_latency = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
    ADMISSION_LATENCY.record(millis_latency, &Into::<Vec<KeyValue>>::into(outcome));
}
