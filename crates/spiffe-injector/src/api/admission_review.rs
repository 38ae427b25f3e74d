use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{admission_request::AdmissionRequest, admission_response::AdmissionResponse};

pub const ADMISSION_API_VERSION: &str = "admission.k8s.io/v1";
pub const ADMISSION_REVIEW_KIND: &str = "AdmissionReview";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("cannot decode admission review: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("admission review is missing apiVersion or kind")]
    MissingTypeMeta,

    #[error("no kind \"{kind}\" is registered for version \"{api_version}\"")]
    Unregistered { api_version: String, kind: String },

    #[error("admission review does not carry a request")]
    MissingRequest,

    #[error("cannot decode admission request: {0}")]
    MalformedRequest(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
#[error("cannot encode admission review: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// The envelope as it comes from the wire. The request is kept untyped until
/// the envelope type has been checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAdmissionReview {
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    request: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub response: AdmissionResponse,
}

impl AdmissionReviewResponse {
    pub fn new(response: AdmissionResponse) -> Self {
        AdmissionReviewResponse {
            api_version: Some(String::from(ADMISSION_API_VERSION)),
            kind: Some(String::from(ADMISSION_REVIEW_KIND)),
            response,
        }
    }
}

/// An `apiVersion`/`kind` pair the codec knows how to handle
#[derive(Clone, Debug, PartialEq, Eq)]
struct RegisteredType {
    api_version: &'static str,
    kind: &'static str,
}

/// Translates AdmissionReview documents from and to their typed form.
///
/// The codec is built once at startup and shared, by reference, with the
/// HTTP handlers.
#[derive(Clone, Debug)]
pub struct AdmissionReviewCodec {
    registered: Vec<RegisteredType>,
}

impl Default for AdmissionReviewCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionReviewCodec {
    pub fn new() -> Self {
        Self {
            registered: vec![RegisteredType {
                api_version: ADMISSION_API_VERSION,
                kind: ADMISSION_REVIEW_KIND,
            }],
        }
    }

    fn is_registered(&self, api_version: &str, kind: &str) -> bool {
        self.registered
            .iter()
            .any(|t| t.api_version == api_version && t.kind == kind)
    }

    /// Decode an AdmissionReview document and extract its request
    pub fn decode(&self, bytes: &[u8]) -> Result<AdmissionRequest, DecodeError> {
        let review: RawAdmissionReview =
            serde_json::from_slice(bytes).map_err(DecodeError::Malformed)?;

        let (api_version, kind) = match (review.api_version, review.kind) {
            (Some(api_version), Some(kind)) if !api_version.is_empty() && !kind.is_empty() => {
                (api_version, kind)
            }
            _ => return Err(DecodeError::MissingTypeMeta),
        };
        if !self.is_registered(&api_version, &kind) {
            return Err(DecodeError::Unregistered { api_version, kind });
        }

        let request = review.request.ok_or(DecodeError::MissingRequest)?;
        if request.is_null() {
            return Err(DecodeError::MissingRequest);
        }
        serde_json::from_value(request).map_err(DecodeError::MalformedRequest)
    }

    /// Wrap the response inside of an AdmissionReview document
    pub fn encode(&self, response: AdmissionResponse) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(&AdmissionReviewResponse::new(response))?)
    }
}
