use crate::{api::admission_review::AdmissionReviewCodec, mutation::Mutator};

pub(crate) struct ApiServerState {
    pub(crate) codec: AdmissionReviewCodec,
    pub(crate) mutator: Mutator,
}
