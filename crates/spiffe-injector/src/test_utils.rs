use k8s_openapi::apimachinery::pkg::runtime::RawExtension;
use serde_json::json;

use crate::admission_request::{AdmissionRequest, GroupVersionKind};
use crate::constants::IDENTITY_LABEL;

/// Pod opted into SPIFFE identity injection, running a single `app`
/// container
pub(crate) fn opted_in_pod() -> serde_json::Value {
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": "web",
            "namespace": "team-a",
            "labels": {
                "app": "web",
                IDENTITY_LABEL: "true"
            }
        },
        "spec": {
            "containers": [
                {"name": "app", "image": "nginx:1.27"}
            ]
        }
    })
}

pub(crate) fn build_admission_request(object: Option<serde_json::Value>) -> AdmissionRequest {
    AdmissionRequest {
        uid: "705ab4f5-6393-11e8-b7cc-42010a800002".to_owned(),
        kind: GroupVersionKind {
            group: "".to_owned(),
            version: "v1".to_owned(),
            kind: "Pod".to_owned(),
        },
        name: Some("web".to_owned()),
        namespace: Some("team-a".to_owned()),
        operation: "CREATE".to_owned(),
        object: object.map(RawExtension),
        dry_run: Some(false),
    }
}
