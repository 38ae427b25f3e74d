/// Label a pod must carry, set to `"true"`, to receive a SPIFFE identity
pub const IDENTITY_LABEL: &str = "spiffe.io/spire-managed-identity";
pub const IDENTITY_LABEL_ENABLED: &str = "true";

/// Image running spiffe-helper, both as init container and as sidecar
pub const HELPER_IMAGE: &str = "docker.io/fengyu225/spiffe-helper:v0.0.1";
pub const HELPER_IMAGE_PULL_POLICY: &str = "Always";
pub const HELPER_INIT_CONTAINER_NAME: &str = "spiffe-helper-init";
pub const HELPER_SIDECAR_NAME: &str = "spiffe-helper";
pub const HELPER_CONFIG_ARG: &str = "/etc/spiffe-helper/helper.conf";

pub const AGENT_SOCKET_VOLUME: &str = "spire-agent-socket";
pub const AGENT_SOCKET_DIR: &str = "/run/spire/agent-sockets";
pub const HELPER_CONFIG_VOLUME: &str = "spiffe-helper-config";
pub const HELPER_CONFIG_DIR: &str = "/etc/spiffe-helper";
pub const CERTS_VOLUME: &str = "spiffe-certs";
pub const CERTS_DIR: &str = "/run/spiffe/certs";

/// ConfigMap holding the spiffe-helper configuration, one per namespace
pub const HELPER_CONFIG_MAP_NAME: &str = "webhook-spiffe-helper-config";
pub const HELPER_CONFIG_FILE_NAME: &str = "helper.conf";
pub const HELPER_CONFIG: &str = r#"agent_address = "/run/spire/agent-sockets/socket"
cert_dir = "/run/spiffe/certs"
svid_file_name = "svid.pem"
svid_key_file_name = "svid_key.pem"
svid_bundle_file_name = "svid_bundle.pem""#;

pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY: &str = "spiffe-injector";
