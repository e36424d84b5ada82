//! Persistence collaborator contract.

use thiserror::Error;

use crate::entity::Editable;

/// Failure reported by a persistence collaborator.
///
/// The gate never retries and never swallows these; a failed persist or
/// delete leaves the entity's dirty state exactly as it was before the
/// attempt.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Backend that persists and deletes entities.
///
/// `persist` handles both the first save of a transient entity (the backend
/// allocates and returns the identifier) and updates of an already
/// persisted one (it returns the existing identifier unchanged). Long
///-running backends run their work off-thread, but completion must be
/// marshalled back before the result is applied to any tracked state.
pub trait Store<E: Editable> {
    fn persist(&mut self, entity: &E) -> Result<E::Id>;

    fn delete(&mut self, entity: &E) -> Result<()>;
}
