//! Contract shared by everything that can be dirty.

use crate::observe::Signal;

/// A cell (or composite of cells) that remembers a saved baseline.
///
/// Implemented by [`DirtyValue`](crate::DirtyValue),
/// [`DirtyAggregate`](crate::DirtyAggregate),
/// [`DirtyCollection`](crate::DirtyCollection), and by entity types that
/// delegate to an aggregate over their fields. Object safe, so composites
/// can hold heterogeneous members.
pub trait Trackable {
    /// True when any tracked state differs from its baseline.
    fn is_dirty(&self) -> bool;

    /// Accept the current state as the new baseline, clearing dirtiness.
    fn rebaseline(&self);

    /// Revert the current state to the baseline, clearing dirtiness.
    fn reset(&self);

    /// The dirty flag as a subscribable signal.
    ///
    /// A tracked cell keeps the same underlying flag cell for its whole
    /// lifetime; composites rely on that for subscription bookkeeping and
    /// element identity.
    fn dirty_signal(&self) -> Signal<bool>;
}
