use axum::Router;
use hyper::{Request, Response, http};
use kube::client::Body;
use serde::Serialize;
use spiffe_injector::{
    SpiffeInjector,
    config::{Config, TlsConfig},
};
use std::{net::SocketAddr, time::Duration};
use tower_test::mock::{Handle, SendResponse};

pub(crate) fn default_test_config() -> Config {
    Config {
        addr: SocketAddr::from(([127, 0, 0, 1], 8443)),
        tls_config: TlsConfig {
            cert_file: "/etc/webhook/certs/svid.pem".into(),
            key_file: "/etc/webhook/certs/svid_key.pem".into(),
        },
        kube_api_timeout: Duration::from_secs(2),
        shutdown_grace_period: Duration::from_secs(1),
        metrics_enabled: false,
        log_level: "info".to_owned(),
        log_fmt: "json".to_owned(),
        log_no_color: false,
    }
}

/// Build the webhook router, backed by a fake API server where the helper
/// ConfigMap already exists in every namespace
pub(crate) async fn app(config: Config) -> Router {
    let (mocksvc, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
    config_map_present(handle).await;

    let client = kube::Client::new(mocksvc, "default");
    let injector = SpiffeInjector::new_with_client(config, client);

    injector.router()
}

async fn config_map_present(handle: Handle<Request<Body>, Response<Body>>) {
    tokio::spawn(async move {
        let mut handle = handle;

        while let Some((request, send)) = handle.next_request().await {
            match (request.method(), request.uri().path()) {
                (&http::Method::GET, path)
                    if path.ends_with("/configmaps/webhook-spiffe-helper-config") =>
                {
                    send_response(
                        send,
                        serde_json::json!({
                            "apiVersion": "v1",
                            "kind": "ConfigMap",
                            "metadata": {"name": "webhook-spiffe-helper-config"},
                            "data": {"helper.conf": ""}
                        }),
                    );
                }
                _ => {
                    panic!("unexpected request: {request:?}");
                }
            }
        }
    });
}

fn send_response<T: Serialize>(send: SendResponse<Response<Body>>, response: T) {
    let response = serde_json::to_vec(&response).unwrap();
    send.send_response(Response::builder().body(Body::from(response)).unwrap());
}
