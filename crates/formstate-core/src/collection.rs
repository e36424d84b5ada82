//! Runtime collection of tracked records.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::observe::{Observable, Signal, Subscription};
use crate::track::Trackable;

struct Entry<E: Trackable> {
    element: E,
    subscription: Subscription,
}

struct Inner<E: Trackable> {
    entries: Vec<Entry<E>>,
}

impl<E: Trackable> Drop for Inner<E> {
    fn drop(&mut self) {
        for entry in &self.entries {
            entry.element.dirty_signal().unsubscribe(entry.subscription);
        }
    }
}

/// Ordered working set of tracked elements with an aggregated dirty flag.
///
/// Unlike [`DirtyAggregate`](crate::DirtyAggregate), membership changes at
/// runtime: elements are subscribed on [`add`](Self::add) and unsubscribed
/// on [`remove`](Self::remove), so no listener outlives its element's
/// membership. Element identity is the element's dirty-signal cell, which
/// is unique per tracked cell for its whole lifetime.
///
/// Clones share state: a list view and the gate driving save/discard can
/// hold the same collection.
pub struct DirtyCollection<E: Trackable> {
    inner: Rc<RefCell<Inner<E>>>,
    dirty: Observable<bool>,
}

impl<E: Trackable> Clone for DirtyCollection<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            dirty: self.dirty.clone(),
        }
    }
}

impl<E: Trackable + 'static> fmt::Debug for DirtyCollection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirtyCollection")
            .field("len", &self.len())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

impl<E: Trackable + 'static> Default for DirtyCollection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Trackable + 'static> DirtyCollection<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                entries: Vec::new(),
            })),
            dirty: Observable::new(false),
        }
    }

    /// Append an element and start tracking its dirty flag.
    ///
    /// An already-dirty element marks the collection dirty immediately.
    /// Adding an element that is already present is ignored, so a repeated
    /// add can never double-subscribe.
    pub fn add(&self, element: E) {
        if self.contains(&element) {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let dirty = self.dirty.clone();
        let subscription = element.dirty_signal().subscribe(move |element_dirty| {
            if *element_dirty {
                dirty.set(true);
            } else if let Some(inner) = weak.upgrade() {
                // Same last-dirty-contributor rule as DirtyAggregate.
                let any_dirty = inner.borrow().entries.iter().any(|e| e.element.is_dirty());
                if !any_dirty {
                    dirty.set(false);
                }
            }
        });
        if element.is_dirty() {
            self.dirty.set(true);
        }
        self.inner.borrow_mut().entries.push(Entry {
            element,
            subscription,
        });
    }

    /// Detach an element and stop tracking it.
    ///
    /// Removing an element that is not present is a no-op. Removing a dirty
    /// element rescans the remainder: the collection only stays dirty if
    /// another dirty element remains.
    pub fn remove(&self, element: &E) {
        let removed = {
            let signal = element.dirty_signal();
            let mut inner = self.inner.borrow_mut();
            inner
                .entries
                .iter()
                .position(|e| e.element.dirty_signal().ptr_eq(&signal))
                .map(|index| inner.entries.remove(index))
        };
        let Some(entry) = removed else {
            return;
        };
        entry.element.dirty_signal().unsubscribe(entry.subscription);
        if entry.element.is_dirty() {
            let any_dirty = self.inner.borrow().entries.iter().any(|e| e.element.is_dirty());
            if !any_dirty {
                self.dirty.set(false);
            }
        }
    }

    pub fn contains(&self, element: &E) -> bool {
        let signal = element.dirty_signal();
        self.inner
            .borrow()
            .entries
            .iter()
            .any(|e| e.element.dirty_signal().ptr_eq(&signal))
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Rebaseline every currently-dirty element, then clear the flag.
    pub fn rebaseline(&self)
    where
        E: Clone,
    {
        for element in self.dirty_elements() {
            element.rebaseline();
        }
        self.dirty.set(false);
    }

    /// Reset every currently-dirty element, then clear the flag.
    pub fn reset(&self)
    where
        E: Clone,
    {
        for element in self.dirty_elements() {
            element.reset();
        }
        self.dirty.set(false);
    }

    pub fn dirty_signal(&self) -> Signal<bool> {
        self.dirty.signal()
    }

    /// Snapshot of the current elements in encounter order.
    pub fn elements(&self) -> Vec<E>
    where
        E: Clone,
    {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|e| e.element.clone())
            .collect()
    }

    /// Snapshot of the currently-dirty elements in encounter order.
    pub fn dirty_elements(&self) -> Vec<E>
    where
        E: Clone,
    {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|e| e.element.is_dirty())
            .map(|e| e.element.clone())
            .collect()
    }
}

impl<E: Trackable + Clone + 'static> Trackable for DirtyCollection<E> {
    fn is_dirty(&self) -> bool {
        DirtyCollection::is_dirty(self)
    }

    fn rebaseline(&self) {
        DirtyCollection::rebaseline(self)
    }

    fn reset(&self) {
        DirtyCollection::reset(self)
    }

    fn dirty_signal(&self) -> Signal<bool> {
        DirtyCollection::dirty_signal(self)
    }
}
