use serde::Serialize;

use crate::constants::*;

/// Volume definition as it appears inside of `spec.volumes`
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct VolumeSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub source: VolumeSource,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub enum VolumeSource {
    #[serde(rename = "hostPath")]
    HostPath {
        path: &'static str,
        #[serde(rename = "type")]
        kind: &'static str,
    },
    #[serde(rename = "configMap")]
    ConfigMap { name: &'static str },
    #[serde(rename = "emptyDir")]
    EmptyDir {},
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMountSpec {
    pub name: &'static str,
    pub mount_path: &'static str,
}

/// Container definition as it appears inside of `spec.initContainers`
/// and `spec.containers`
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub name: &'static str,
    pub image: &'static str,
    pub image_pull_policy: &'static str,
    pub args: Vec<&'static str>,
    pub volume_mounts: Vec<VolumeMountSpec>,
}

/// Volumes required by the spiffe-helper containers, in the order they are
/// added to the pod
pub(crate) fn required_volumes() -> Vec<VolumeSpec> {
    vec![
        VolumeSpec {
            name: AGENT_SOCKET_VOLUME,
            source: VolumeSource::HostPath {
                path: AGENT_SOCKET_DIR,
                kind: "Directory",
            },
        },
        VolumeSpec {
            name: HELPER_CONFIG_VOLUME,
            source: VolumeSource::ConfigMap {
                name: HELPER_CONFIG_MAP_NAME,
            },
        },
        VolumeSpec {
            name: CERTS_VOLUME,
            source: VolumeSource::EmptyDir {},
        },
    ]
}

fn helper_volume_mounts() -> Vec<VolumeMountSpec> {
    vec![
        VolumeMountSpec {
            name: HELPER_CONFIG_VOLUME,
            mount_path: HELPER_CONFIG_DIR,
        },
        VolumeMountSpec {
            name: AGENT_SOCKET_VOLUME,
            mount_path: AGENT_SOCKET_DIR,
        },
        VolumeMountSpec {
            name: CERTS_VOLUME,
            mount_path: CERTS_DIR,
        },
    ]
}

/// Runs spiffe-helper once, so the SVID is on disk before the workload starts
pub(crate) fn init_container() -> ContainerSpec {
    ContainerSpec {
        name: HELPER_INIT_CONTAINER_NAME,
        image: HELPER_IMAGE,
        image_pull_policy: HELPER_IMAGE_PULL_POLICY,
        args: vec!["-config", HELPER_CONFIG_ARG, "-daemon-mode=false"],
        volume_mounts: helper_volume_mounts(),
    }
}

/// Keeps spiffe-helper running next to the workload to rotate the SVID
pub(crate) fn sidecar_container() -> ContainerSpec {
    ContainerSpec {
        name: HELPER_SIDECAR_NAME,
        image: HELPER_IMAGE,
        image_pull_policy: HELPER_IMAGE_PULL_POLICY,
        args: vec!["-config", HELPER_CONFIG_ARG],
        volume_mounts: helper_volume_mounts(),
    }
}
