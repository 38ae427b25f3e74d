use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::{self, TraceLayer};
use tracing::Level;

pub mod admission_review;
pub(crate) mod api_error;
pub(crate) mod handlers;
pub(crate) mod state;

use handlers::{mutate_handler, readiness_handler};
use state::ApiServerState;

pub(crate) fn router(state: Arc<ApiServerState>) -> Router {
    Router::new()
        .route("/mutate", post(mutate_handler))
        .route("/readiness", get(readiness_handler))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
}
