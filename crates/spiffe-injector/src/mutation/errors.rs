use thiserror::Error;

pub type Result<T> = std::result::Result<T, MutationError>;

#[derive(Error, Debug)]
pub enum MutationError {
    #[error("admission request does not carry an object")]
    MissingObject,

    #[error("cannot decode object as a Pod: {0}")]
    InvalidObject(#[source] serde_json::Error),

    #[error("cannot serialize JSON patch: {0}")]
    PatchSerialization(#[source] serde_json::Error),
}
