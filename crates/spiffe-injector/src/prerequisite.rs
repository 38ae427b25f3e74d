use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, PostParams};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::constants::{
    HELPER_CONFIG, HELPER_CONFIG_FILE_NAME, HELPER_CONFIG_MAP_NAME, MANAGED_BY, MANAGED_BY_LABEL,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnsureOutcome {
    AlreadyPresent,
    Created,
    /// The resource could not be provisioned. This is never fatal, the
    /// admission request is processed anyway.
    Warning(String),
}

/// Makes sure the namespace of the pod holds everything the injected
/// containers depend on
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PrerequisiteEnsurer: Send + Sync {
    async fn ensure(&self, namespace: &str) -> EnsureOutcome;
}

/// Provisions the spiffe-helper ConfigMap inside of the namespace of the pod.
///
/// An existing ConfigMap is never updated, its contents are not compared
/// with the expected ones.
#[derive(Clone)]
pub struct ConfigMapEnsurer {
    client: kube::Client,
    timeout: Duration,
}

impl ConfigMapEnsurer {
    pub fn new(client: kube::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

pub(crate) fn helper_config_map(namespace: &str) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(HELPER_CONFIG_MAP_NAME.to_owned()),
            namespace: Some(namespace.to_owned()),
            labels: Some(BTreeMap::from([(
                MANAGED_BY_LABEL.to_owned(),
                MANAGED_BY.to_owned(),
            )])),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            HELPER_CONFIG_FILE_NAME.to_owned(),
            HELPER_CONFIG.to_owned(),
        )])),
        ..Default::default()
    }
}

#[async_trait]
impl PrerequisiteEnsurer for ConfigMapEnsurer {
    async fn ensure(&self, namespace: &str) -> EnsureOutcome {
        if namespace.is_empty() {
            return EnsureOutcome::Warning(
                "admission request has no namespace, cannot provision the helper ConfigMap"
                    .to_owned(),
            );
        }

        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);

        // a failed lookup is not conclusive, creation is attempted anyway
        match timeout(self.timeout, api.get_opt(HELPER_CONFIG_MAP_NAME)).await {
            Ok(Ok(Some(_))) => {
                debug!(namespace, name = HELPER_CONFIG_MAP_NAME, "ConfigMap found");
                return EnsureOutcome::AlreadyPresent;
            }
            Ok(Ok(None)) => {
                debug!(namespace, name = HELPER_CONFIG_MAP_NAME, "ConfigMap not found");
            }
            Ok(Err(e)) => {
                debug!(namespace, name = HELPER_CONFIG_MAP_NAME, error = %e, "cannot look up ConfigMap");
            }
            Err(_) => {
                debug!(namespace, name = HELPER_CONFIG_MAP_NAME, "ConfigMap lookup timed out");
            }
        }

        let config_map = helper_config_map(namespace);
        match timeout(
            self.timeout,
            api.create(&PostParams::default(), &config_map),
        )
        .await
        {
            Ok(Ok(_)) => {
                info!(namespace, name = HELPER_CONFIG_MAP_NAME, "ConfigMap created");
                EnsureOutcome::Created
            }
            Ok(Err(e)) => EnsureOutcome::Warning(format!(
                "cannot create ConfigMap {HELPER_CONFIG_MAP_NAME} in namespace {namespace}: {e}"
            )),
            Err(_) => EnsureOutcome::Warning(format!(
                "creation of ConfigMap {HELPER_CONFIG_MAP_NAME} in namespace {namespace} timed out after {:?}",
                self.timeout
            )),
        }
    }
}
