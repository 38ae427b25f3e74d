use axum::{
    body::{self, Body},
    extract,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{Span, debug, error, warn};

use crate::{
    admission_request::AdmissionRequest,
    admission_response::AdmissionResponse,
    api::{api_error::ApiError, state::ApiServerState},
    metrics,
};

/// Largest AdmissionReview accepted, bigger bodies are treated as empty
const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

#[tracing::instrument(
    name = "mutation",
    fields(
        request_uid=tracing::field::Empty,
        host=crate::config::HOSTNAME.as_str(),
        name=tracing::field::Empty,
        namespace=tracing::field::Empty,
        operation=tracing::field::Empty,
        kind_group=tracing::field::Empty,
        kind_version=tracing::field::Empty,
        kind=tracing::field::Empty,
        allowed=tracing::field::Empty,
        mutated=tracing::field::Empty,
        response_message=tracing::field::Empty,
    ),
    skip_all)]
/// Receive an AdmissionReview and answer with the patch injecting the
/// spiffe-helper into the pod.
///
/// Decoding and mutation failures are reported inside of the AdmissionReview,
/// only protocol violations are answered with an HTTP error.
pub(crate) async fn mutate_handler(
    extract::State(state): extract::State<Arc<ApiServerState>>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, (StatusCode, ApiError)> {
    check_content_type(&headers)?;

    let start_time = Instant::now();

    let bytes = match body::to_bytes(body, MAX_BODY_SIZE).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "cannot read request body");
            Default::default()
        }
    };

    let (namespace, response) = match state.codec.decode(&bytes) {
        Ok(request) => {
            populate_span_with_admission_request_data(&request);
            let response = state.mutator.decide(&request).await;
            (request.namespace, response)
        }
        Err(e) => {
            warn!(error = %e, "cannot decode admission review");
            (None, AdmissionResponse::reject(String::new(), e.to_string()))
        }
    };

    populate_span_with_mutation_results(&response);

    let outcome = metrics::AdmissionOutcome::new(namespace, &response);
    metrics::record_admission_latency(start_time.elapsed(), &outcome);
    metrics::add_admission_request(&outcome);

    let payload = state.codec.encode(response).map_err(|e| {
        error!(error = %e, "cannot encode admission review");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Something went wrong".to_owned(),
            },
        )
    })?;
    debug!(size = payload.len(), "admission review encoded");

    Ok((
        [(header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
        payload,
    ))
}

pub(crate) async fn readiness_handler() -> StatusCode {
    StatusCode::OK
}

fn check_content_type(headers: &HeaderMap) -> Result<(), (StatusCode, ApiError)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    if content_type == Some(mime::APPLICATION_JSON.essence_str()) {
        return Ok(());
    }

    let message = format!(
        "unsupported content type {}, only {} is supported",
        content_type.unwrap_or("<none>"),
        mime::APPLICATION_JSON
    );
    debug!(%message, "request rejected");
    Err((
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ApiError {
            status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
            message,
        },
    ))
}

fn populate_span_with_admission_request_data(adm_req: &AdmissionRequest) {
    Span::current().record("kind", adm_req.kind.kind.as_str());
    Span::current().record("kind_group", adm_req.kind.group.as_str());
    Span::current().record("kind_version", adm_req.kind.version.as_str());
    Span::current().record("name", adm_req.name.clone().unwrap_or_default().as_str());
    Span::current().record(
        "namespace",
        adm_req.namespace.clone().unwrap_or_default().as_str(),
    );
    Span::current().record("operation", adm_req.operation.as_str());
    Span::current().record("request_uid", adm_req.uid.as_str());
}

fn populate_span_with_mutation_results(response: &AdmissionResponse) {
    Span::current().record("allowed", response.allowed);
    Span::current().record("mutated", response.is_mutating());
    if let Some(message) = response.message() {
        Span::current().record("response_message", message);
    }
}
