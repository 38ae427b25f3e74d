use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    admission_request::AdmissionRequest,
    admission_response::AdmissionResponse,
    prerequisite::{EnsureOutcome, PrerequisiteEnsurer},
};

pub(crate) mod artifacts;
pub(crate) mod eligibility;
pub mod errors;
pub(crate) mod patch;
pub(crate) mod planner;
pub(crate) mod pod_view;

use eligibility::is_eligible;
use errors::{MutationError, Result};
use pod_view::PodSpecView;

/// Decides how a Pod has to be changed to receive a SPIFFE identity
#[derive(Clone)]
pub struct Mutator {
    ensurer: Arc<dyn PrerequisiteEnsurer>,
}

impl Mutator {
    pub fn new(ensurer: Arc<dyn PrerequisiteEnsurer>) -> Self {
        Self { ensurer }
    }

    /// Build the admission response for the given request.
    ///
    /// Pods that did not opt in are admitted unchanged. Opted-in pods are
    /// admitted with a JSON patch adding whatever part of the spiffe-helper
    /// instrumentation they are missing. When the object cannot be
    /// processed the response carries the error message and is not allowed.
    pub async fn decide(&self, request: &AdmissionRequest) -> AdmissionResponse {
        match self.mutate(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "cannot process admission request");
                AdmissionResponse::reject(request.uid.clone(), e.to_string())
            }
        }
    }

    async fn mutate(&self, request: &AdmissionRequest) -> Result<AdmissionResponse> {
        let object = request
            .object
            .as_ref()
            .ok_or(MutationError::MissingObject)?;
        let pod = PodSpecView::from_object(&object.0).map_err(MutationError::InvalidObject)?;

        if !is_eligible(&pod) {
            debug!("pod did not opt in, skipping");
            return Ok(AdmissionResponse::allow(request.uid.clone()));
        }

        let namespace = request.namespace.as_deref().unwrap_or_default();
        match self.ensurer.ensure(namespace).await {
            EnsureOutcome::Warning(reason) => {
                warn!(namespace, %reason, "prerequisites not provisioned, mutating anyway");
            }
            outcome => {
                debug!(namespace, ?outcome, "prerequisites provisioned");
            }
        }

        let operations = planner::plan(&pod);
        let patch = serde_json::to_vec(&operations).map_err(MutationError::PatchSerialization)?;
        info!(operations = operations.len(), "pod mutated");

        Ok(AdmissionResponse::allow_with_patch(
            request.uid.clone(),
            &patch,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission_response::PatchType;
    use crate::prerequisite::MockPrerequisiteEnsurer;
    use crate::test_utils::{build_admission_request, opted_in_pod};

    use base64::{Engine as _, engine::general_purpose};
    use rstest::*;
    use serde_json::json;

    fn decode_patch(response: &AdmissionResponse) -> serde_json::Value {
        let patch = response.patch.as_ref().expect("patch should be set");
        let bytes = general_purpose::STANDARD.decode(patch).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn patch_paths(response: &AdmissionResponse) -> Vec<String> {
        decode_patch(response)
            .as_array()
            .unwrap()
            .iter()
            .map(|op| {
                assert_eq!(op["op"], "add");
                op["path"].as_str().unwrap().to_owned()
            })
            .collect()
    }

    fn ensurer_returning(outcome: EnsureOutcome) -> Arc<dyn PrerequisiteEnsurer> {
        let mut ensurer = MockPrerequisiteEnsurer::new();
        ensurer.expect_ensure().times(1).returning(move |namespace| {
            assert_eq!(namespace, "team-a");
            outcome.clone()
        });
        Arc::new(ensurer)
    }

    fn ensurer_never_called() -> Arc<dyn PrerequisiteEnsurer> {
        let mut ensurer = MockPrerequisiteEnsurer::new();
        ensurer.expect_ensure().never();
        Arc::new(ensurer)
    }

    #[rstest]
    #[case::no_labels(json!(null))]
    #[case::label_disabled(json!({"spiffe.io/spire-managed-identity": "false"}))]
    #[case::label_capitalized(json!({"spiffe.io/spire-managed-identity": "True"}))]
    #[tokio::test]
    async fn pod_not_opted_in(#[case] labels: serde_json::Value) {
        let mut pod = opted_in_pod();
        pod["metadata"]["labels"] = labels;
        let request = build_admission_request(Some(pod));

        let mutator = Mutator::new(ensurer_never_called());
        let response = mutator.decide(&request).await;

        assert_eq!(response, AdmissionResponse::allow(request.uid.clone()));
    }

    #[tokio::test]
    async fn bare_pod_is_fully_instrumented() {
        let request = build_admission_request(Some(opted_in_pod()));

        let mutator = Mutator::new(ensurer_returning(EnsureOutcome::Created));
        let response = mutator.decide(&request).await;

        assert!(response.allowed);
        assert_eq!(response.uid, request.uid);
        assert_eq!(response.patch_type, Some(PatchType::JSONPatch));
        assert_eq!(
            patch_paths(&response),
            vec![
                "/spec/volumes",
                "/spec/volumes/-",
                "/spec/volumes/-",
                "/spec/volumes/-",
                "/spec/initContainers",
                "/spec/initContainers/-",
                "/spec/containers/-",
            ]
        );

        let patch = decode_patch(&response);
        assert_eq!(patch[0]["value"], json!([]));
        assert_eq!(patch[1]["value"]["name"], "spire-agent-socket");
        assert_eq!(patch[2]["value"]["name"], "spiffe-helper-config");
        assert_eq!(patch[3]["value"]["name"], "spiffe-certs");
        assert_eq!(patch[4]["value"], json!([]));
        assert_eq!(patch[5]["value"]["name"], "spiffe-helper-init");
        assert_eq!(patch[6]["value"]["name"], "spiffe-helper");
    }

    #[tokio::test]
    async fn declared_empty_volumes() {
        let mut pod = opted_in_pod();
        pod["spec"]["volumes"] = json!([]);
        let request = build_admission_request(Some(pod));

        let mutator = Mutator::new(ensurer_returning(EnsureOutcome::AlreadyPresent));
        let response = mutator.decide(&request).await;

        assert!(response.allowed);
        assert_eq!(
            patch_paths(&response),
            vec![
                "/spec/volumes/-",
                "/spec/volumes/-",
                "/spec/volumes/-",
                "/spec/initContainers",
                "/spec/initContainers/-",
                "/spec/containers/-",
            ]
        );
    }

    #[tokio::test]
    async fn only_sidecar_missing() {
        let mut pod = opted_in_pod();
        pod["spec"]["volumes"] = json!([
            {"name": "spire-agent-socket", "hostPath": {"path": "/run/spire/agent-sockets"}},
            {"name": "spiffe-helper-config", "configMap": {"name": "webhook-spiffe-helper-config"}},
            {"name": "spiffe-certs", "emptyDir": {}}
        ]);
        pod["spec"]["initContainers"] = json!([{"name": "spiffe-helper-init"}]);
        let request = build_admission_request(Some(pod));

        let mutator = Mutator::new(ensurer_returning(EnsureOutcome::AlreadyPresent));
        let response = mutator.decide(&request).await;

        assert!(response.allowed);
        assert_eq!(patch_paths(&response), vec!["/spec/containers/-"]);
        assert_eq!(decode_patch(&response)[0]["value"]["name"], "spiffe-helper");
    }

    #[tokio::test]
    async fn patched_pod_needs_no_further_changes() {
        let pod = opted_in_pod();
        let request = build_admission_request(Some(pod.clone()));

        let mutator = Mutator::new(ensurer_returning(EnsureOutcome::Created));
        let response = mutator.decide(&request).await;

        let patch: json_patch::Patch = serde_json::from_value(decode_patch(&response)).unwrap();
        let mut patched = pod;
        json_patch::patch(&mut patched, &patch.0).expect("patch should apply");

        let containers: Vec<&str> = patched["spec"]["containers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(containers, vec!["app", "spiffe-helper"]);

        let request = build_admission_request(Some(patched));
        let mutator = Mutator::new(ensurer_returning(EnsureOutcome::AlreadyPresent));
        let response = mutator.decide(&request).await;

        assert!(response.allowed);
        // an empty list of operations is still attached
        assert_eq!(response.patch.as_deref(), Some("W10="));
        assert_eq!(decode_patch(&response), json!([]));
    }

    #[tokio::test]
    async fn ensure_warning_does_not_block_mutation() {
        let request = build_admission_request(Some(opted_in_pod()));

        let mutator = Mutator::new(ensurer_returning(EnsureOutcome::Warning(
            "configmaps is forbidden".to_owned(),
        )));
        let response = mutator.decide(&request).await;

        assert!(response.allowed);
        assert_eq!(patch_paths(&response).len(), 7);
    }

    #[rstest]
    #[case::missing_object(None)]
    #[case::containers_not_a_list(Some(json!({"spec": {"containers": "app"}})))]
    #[case::not_an_object(Some(json!("web")))]
    #[tokio::test]
    async fn malformed_object(#[case] object: Option<serde_json::Value>) {
        let request = build_admission_request(object);

        let mutator = Mutator::new(ensurer_never_called());
        let response = mutator.decide(&request).await;

        assert!(!response.allowed);
        assert_eq!(response.uid, request.uid);
        assert!(response.patch.is_none());
        assert!(!response.message().unwrap_or_default().is_empty());
    }
}
