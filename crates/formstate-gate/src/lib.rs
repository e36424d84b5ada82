//! Save/discard/delete gating over dirty-tracked entities.
//!
//! Sits on top of `formstate-core`: an entity couples a nullable persistent
//! identifier, a field aggregate, and an externally driven validity flag
//! ([`EntityCore`] / [`Editable`]); the [`OperationGate`] derives which of
//! save, discard, and delete are currently permitted for the selected
//! entity and executes them against a persistence collaborator ([`Store`]).
//! Batch save/discard across a whole collection lives in [`batch`].

pub mod batch;
pub mod entity;
pub mod gate;
pub mod store;

pub use batch::{BatchFailure, BatchReport, discard_all, save_all};
pub use entity::{Editable, EntityCore};
pub use gate::OperationGate;
pub use store::{Result, Store, StoreError};
