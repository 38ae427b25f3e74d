use k8s_openapi::api::core::v1::Pod;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Read model of the parts of a Pod the injector cares about.
///
/// `volumes` and `init_containers` are `None` when the field is missing from
/// the Pod spec, and `Some` (possibly empty) when it is declared. The
/// distinction matters when building JSON-Patch documents: a missing array
/// has to be created before items can be appended to it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PodSpecView {
    pub labels: BTreeMap<String, String>,
    pub volumes: Option<Vec<String>>,
    pub init_containers: Option<Vec<String>>,
    pub containers: Vec<String>,
}

impl PodSpecView {
    pub fn from_object(object: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let pod = Pod::deserialize(object)?;
        Ok(Self::from(&pod))
    }
}

impl From<&Pod> for PodSpecView {
    fn from(pod: &Pod) -> Self {
        let labels = pod.metadata.labels.clone().unwrap_or_default();

        match &pod.spec {
            Some(spec) => PodSpecView {
                labels,
                volumes: spec
                    .volumes
                    .as_ref()
                    .map(|volumes| volumes.iter().map(|v| v.name.clone()).collect()),
                init_containers: spec
                    .init_containers
                    .as_ref()
                    .map(|containers| containers.iter().map(|c| c.name.clone()).collect()),
                containers: spec.containers.iter().map(|c| c.name.clone()).collect(),
            },
            None => PodSpecView {
                labels,
                ..Default::default()
            },
        }
    }
}
