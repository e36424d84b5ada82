//! Dirty-state tracking model.
//!
//! Building blocks for edit screens that need to know whether anything on
//! screen differs from its last-saved state: a value cell that remembers a
//! baseline ([`DirtyValue`]), a fixed composite over an entity's fields
//! ([`DirtyAggregate`]), and a runtime collection of tracked records
//! ([`DirtyCollection`]). All state is single-threaded by construction;
//! background work must marshal its completion back before touching it.

pub mod aggregate;
pub mod collection;
pub mod observe;
pub mod track;
pub mod value;

pub use aggregate::DirtyAggregate;
pub use collection::DirtyCollection;
pub use observe::{Observable, Signal, Subscription};
pub use track::Trackable;
pub use value::DirtyValue;
