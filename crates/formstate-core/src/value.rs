//! Single-field dirty tracking.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::observe::{Observable, Signal, Subscription};
use crate::track::Trackable;

/// A mutable value cell that remembers the last-accepted baseline.
///
/// `is_dirty()` is true exactly when the current value differs from the
/// baseline under `PartialEq`. Value changes and dirty-flag changes are
/// distinct signals: a view binding typically subscribes to the former, a
/// parent aggregate to the latter.
///
/// Clones share state, so a field can live in its owning entity and in that
/// entity's [`DirtyAggregate`](crate::DirtyAggregate) at the same time.
pub struct DirtyValue<T: PartialEq + Clone> {
    value: Observable<T>,
    baseline: Rc<RefCell<T>>,
    dirty: Observable<bool>,
}

impl<T: PartialEq + Clone> Clone for DirtyValue<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            baseline: Rc::clone(&self.baseline),
            dirty: self.dirty.clone(),
        }
    }
}

impl<T: PartialEq + Clone + fmt::Debug> fmt::Debug for DirtyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirtyValue")
            .field("current", &self.value)
            .field("baseline", &self.baseline.borrow())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

impl<T: PartialEq + Clone> DirtyValue<T> {
    /// Create a clean cell: current and baseline both start at `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            value: Observable::new(initial.clone()),
            baseline: Rc::new(RefCell::new(initial)),
            dirty: Observable::new(false),
        }
    }

    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Replace the current value and recompute the dirty flag.
    ///
    /// Setting the value back to the baseline clears dirtiness; comparison
    /// is semantic equality, never identity. Both cells are updated before
    /// either notification fires, so a value listener reading
    /// [`is_dirty`](Self::is_dirty) and a dirty listener reading
    /// [`get`](Self::get) both see post-edit state.
    pub fn set(&self, value: T) {
        let is_dirty = {
            let baseline = self.baseline.borrow();
            value != *baseline
        };
        let value_listeners = self.value.stage(value.clone());
        let dirty_listeners = self.dirty.stage(is_dirty);
        for listener in value_listeners {
            listener(&value);
        }
        for listener in dirty_listeners {
            listener(&is_dirty);
        }
    }

    /// Subscribe to value changes (not dirty-flag changes).
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.value.subscribe(listener)
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.value.unsubscribe(subscription)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Accept the current value as the new baseline.
    pub fn rebaseline(&self) {
        {
            let mut baseline = self.baseline.borrow_mut();
            *baseline = self.value.get();
        }
        self.dirty.set(false);
    }

    /// Revert the current value to the baseline.
    pub fn reset(&self) {
        let baseline = self.baseline.borrow().clone();
        let value_listeners = self.value.stage(baseline.clone());
        let dirty_listeners = self.dirty.stage(false);
        for listener in value_listeners {
            listener(&baseline);
        }
        for listener in dirty_listeners {
            listener(&false);
        }
    }

    pub fn dirty_signal(&self) -> Signal<bool> {
        self.dirty.signal()
    }
}

impl<T: PartialEq + Clone> Trackable for DirtyValue<T> {
    fn is_dirty(&self) -> bool {
        DirtyValue::is_dirty(self)
    }

    fn rebaseline(&self) {
        DirtyValue::rebaseline(self)
    }

    fn reset(&self) {
        DirtyValue::reset(self)
    }

    fn dirty_signal(&self) -> Signal<bool> {
        DirtyValue::dirty_signal(self)
    }
}
