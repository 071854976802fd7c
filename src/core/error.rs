use crate::copy::CopyError;
use crate::core::id::{EntityRef, RevisionNumber};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RevisionError {
    #[error("Revision {revision} not found for {entity}")]
    UnknownRevision {
        entity: EntityRef,
        revision: RevisionNumber,
    },

    #[error("{0} not found")]
    NotFound(EntityRef),

    #[error("Must not change state of frozen objects: {0}")]
    ImmutableState(&'static str),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Getting the latest revision of {0} from history is not well defined")]
    HistoricalView(EntityRef),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error(transparent)]
    Copy(#[from] CopyError),
}

pub type Result<T> = std::result::Result<T, RevisionError>;

impl<T> From<std::sync::PoisonError<T>> for RevisionError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<serde_json::Error> for RevisionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
