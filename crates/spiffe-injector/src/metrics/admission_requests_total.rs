use lazy_static::lazy_static;
use opentelemetry::{KeyValue, metrics::Counter};

use super::AdmissionOutcome;

lazy_static! {
    static ref ADMISSION_REQUESTS_TOTAL: Counter<u64> =
        opentelemetry::global::meter(super::METER_NAME)
            .u64_counter("spiffe_injector_admission_requests_total")
            .build();
}

pub fn add_admission_request(outcome: &AdmissionOutcome) {
    ADMISSION_REQUESTS_TOTAL.add(1, &Into::<Vec<KeyValue>>::into(outcome));
}
