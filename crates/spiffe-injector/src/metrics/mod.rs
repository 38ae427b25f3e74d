use anyhow::Result;
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::{ExportConfig, WithExportConfig};

mod admission_latency;
pub use admission_latency::record_admission_latency;
mod admission_requests_total;
pub use admission_requests_total::add_admission_request;

const METER_NAME: &str = "spiffe-injector";

/// Install an OTLP metric exporter as the global meter provider.
/// The collector is reached over gRPC, using the standard `OTEL_EXPORTER_OTLP_*`
/// environment variables.
pub fn setup_metrics() -> Result<()> {
    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_export_config(ExportConfig::default())
        .build()?;

    let periodic_reader =
        opentelemetry_sdk::metrics::PeriodicReader::builder(metric_exporter).build();
    let meter_provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
        .with_reader(periodic_reader)
        .build();

    global::set_meter_provider(meter_provider);
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The pod opted in and a non-empty patch was attached
    Mutated,
    /// The pod was admitted unchanged
    Skipped,
    /// The admission review could not be processed
    Rejected,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Mutated => "mutated",
            Outcome::Skipped => "skipped",
            Outcome::Rejected => "rejected",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AdmissionOutcome {
    pub(crate) outcome: Outcome,
    pub(crate) namespace: Option<String>,
    pub(crate) allowed: bool,
    pub(crate) mutated: bool,
}

impl AdmissionOutcome {
    pub(crate) fn new(
        namespace: Option<String>,
        response: &crate::admission_response::AdmissionResponse,
    ) -> Self {
        let mutated = response.is_mutating();
        let outcome = match (response.allowed, mutated) {
            (true, true) => Outcome::Mutated,
            (true, false) => Outcome::Skipped,
            (false, _) => Outcome::Rejected,
        };

        Self {
            outcome,
            namespace,
            allowed: response.allowed,
            mutated,
        }
    }
}

#[allow(clippy::from_over_into)]
impl Into<Vec<KeyValue>> for &AdmissionOutcome {
    fn into(self) -> Vec<KeyValue> {
        let mut baggage = vec![
            KeyValue::new("outcome", self.outcome.as_str()),
            KeyValue::new("allowed", self.allowed),
            KeyValue::new("mutated", self.mutated),
        ];
        if let Some(namespace) = &self.namespace {
            baggage.push(KeyValue::new("namespace", namespace.clone()));
        }
        baggage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission_response::AdmissionResponse;
    use rstest::*;

    #[rstest]
    #[case::mutated(
        AdmissionResponse::allow_with_patch("uid".to_owned(), br#"[{"op":"add","path":"/spec/volumes","value":[]}]"#),
        Outcome::Mutated
    )]
    #[case::empty_patch(AdmissionResponse::allow_with_patch("uid".to_owned(), b"[]"), Outcome::Skipped)]
    #[case::skipped(AdmissionResponse::allow("uid".to_owned()), Outcome::Skipped)]
    #[case::rejected(AdmissionResponse::reject("uid".to_owned(), "boom".to_owned()), Outcome::Rejected)]
    fn outcome_from_response(#[case] response: AdmissionResponse, #[case] expected: Outcome) {
        let outcome = AdmissionOutcome::new(None, &response);
        assert_eq!(outcome.outcome, expected);
    }

    #[test]
    fn namespace_attribute_is_optional() {
        let response = AdmissionResponse::allow("uid".to_owned());

        let attributes: Vec<KeyValue> = (&AdmissionOutcome::new(None, &response)).into();
        assert_eq!(attributes.len(), 3);

        let attributes: Vec<KeyValue> =
            (&AdmissionOutcome::new(Some("team-a".to_owned()), &response)).into();
        assert_eq!(attributes.len(), 4);
        assert_eq!(attributes[0].key.as_str(), "outcome");
        assert_eq!(attributes[0].value.as_str(), "skipped");
        assert_eq!(attributes[3].key.as_str(), "namespace");
        assert_eq!(attributes[3].value.as_str(), "team-a");
    }
}
