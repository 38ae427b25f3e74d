pub mod admission_request;
pub mod admission_response;
pub mod api;
mod certs;
pub mod cli;
pub mod config;
pub mod constants;
pub mod metrics;
pub mod mutation;
pub mod prerequisite;
pub mod tracing;

#[cfg(test)]
mod test_utils;

use ::tracing::{error, info, warn};
use anyhow::{Result, anyhow};
use axum::Router;
use axum_server::Handle;
use lazy_static::lazy_static;
use std::{process, sync::Arc, sync::RwLock};
use tokio::signal;

use crate::{
    api::{admission_review::AdmissionReviewCodec, state::ApiServerState},
    config::Config,
    mutation::Mutator,
    prerequisite::ConfigMapEnsurer,
};

lazy_static! {
    pub static ref TRACE_SYSTEM_INITIALIZED: RwLock<bool> = RwLock::new(false);
}

/// The mutating admission webhook injecting spiffe-helper into pods
pub struct SpiffeInjector {
    router: Router,
    config: Config,
}

impl SpiffeInjector {
    /// Build the server, connecting to the Kubernetes cluster through the
    /// in-cluster configuration or the local kubeconfig file
    pub async fn new_from_config(config: Config) -> Result<Self> {
        let client = kube::Client::try_default()
            .await
            .map_err(|e| anyhow!("Cannot connect to Kubernetes cluster: {e}"))?;

        Ok(Self::new_with_client(config, client))
    }

    pub fn new_with_client(config: Config, client: kube::Client) -> Self {
        let ensurer = ConfigMapEnsurer::new(client, config.kube_api_timeout);
        let state = Arc::new(ApiServerState {
            codec: AdmissionReviewCodec::new(),
            mutator: Mutator::new(Arc::new(ensurer)),
        });

        Self {
            router: api::router(state),
            config,
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve HTTPS requests until SIGINT or SIGTERM is received
    pub async fn run(self) -> Result<()> {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            warn!("a default crypto provider is already installed");
        }

        let tls_config = certs::create_tls_config(&self.config.tls_config).await?;

        let handle = Handle::new();
        tokio::spawn(shutdown_signal(
            handle.clone(),
            self.config.shutdown_grace_period,
        ));

        info!(address = %self.config.addr, "started HTTPS server");
        axum_server::bind_rustls(self.config.addr, tls_config)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await
            .map_err(|e| anyhow!("HTTPS server failure: {e}"))?;
        info!("HTTPS server stopped");

        Ok(())
    }
}

async fn shutdown_signal(handle: Handle, grace_period: std::time::Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(
        grace_period_seconds = grace_period.as_secs(),
        "shutdown signal received, draining connections"
    );
    handle.graceful_shutdown(Some(grace_period));
}

pub fn fatal_error(msg: String) {
    let trace_system_ready = TRACE_SYSTEM_INITIALIZED
        .read()
        .map(|ready| *ready)
        .unwrap_or_default();
    if trace_system_ready {
        error!("{}", msg);
        tracing::shutdown_tracing();
    } else {
        eprintln!("{msg}");
    }

    process::exit(1);
}
