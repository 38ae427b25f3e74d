use spiffe_injector::{
    SpiffeInjector, TRACE_SYSTEM_INITIALIZED, cli, config::Config, fatal_error,
    metrics::setup_metrics, tracing::setup_tracing,
};
use tracing::debug;

#[tokio::main]
async fn main() {
    let matches = cli::build_cli().get_matches();
    let config = match Config::from_args(&matches) {
        Ok(config) => config,
        Err(e) => {
            fatal_error(e.to_string());
            return;
        }
    };

    // Setup the tracing system. This MUST be done inside of a tokio Runtime
    // because some collectors rely on it and would panic otherwise.
    if let Err(e) = setup_tracing(&config.log_level, &config.log_fmt, config.log_no_color) {
        fatal_error(e.to_string());
        return;
    }
    debug!("tracing system ready");
    if let Ok(mut initialized) = TRACE_SYSTEM_INITIALIZED.write() {
        *initialized = true;
    }

    if config.metrics_enabled {
        if let Err(e) = setup_metrics() {
            fatal_error(format!("cannot setup metrics: {e}"));
            return;
        }
    }

    let injector = match SpiffeInjector::new_from_config(config).await {
        Ok(injector) => injector,
        Err(e) => {
            fatal_error(e.to_string());
            return;
        }
    };

    if let Err(e) = injector.run().await {
        fatal_error(e.to_string());
    }

    spiffe_injector::tracing::shutdown_tracing();
}
