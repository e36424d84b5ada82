//! Fixed composite over an entity's tracked fields.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::observe::{Observable, Signal, Subscription};
use crate::track::Trackable;

struct Member {
    handle: Rc<dyn Trackable>,
    subscription: Subscription,
}

struct Inner {
    members: Vec<Member>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        for member in &self.members {
            member.handle.dirty_signal().unsubscribe(member.subscription);
        }
    }
}

/// Dirty flag aggregated over a fixed set of member cells.
///
/// One aggregate lives per entity and is populated with that entity's
/// fields at construction time; membership does not change afterwards. The
/// aggregate is dirty while any member is dirty:
/// - a member becoming dirty flips the aggregate dirty immediately;
/// - a member becoming clean only clears the aggregate after a rescan
///   confirms it was the last dirty contributor.
///
/// Aggregates implement [`Trackable`] themselves, so an aggregate can be a
/// member of a parent aggregate or live in a
/// [`DirtyCollection`](crate::DirtyCollection). Clones share state.
pub struct DirtyAggregate {
    inner: Rc<RefCell<Inner>>,
    dirty: Observable<bool>,
}

impl Clone for DirtyAggregate {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            dirty: self.dirty.clone(),
        }
    }
}

impl fmt::Debug for DirtyAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirtyAggregate")
            .field("members", &self.inner.borrow().members.len())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

impl Default for DirtyAggregate {
    fn default() -> Self {
        Self::new()
    }
}

impl DirtyAggregate {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                members: Vec::new(),
            })),
            dirty: Observable::new(false),
        }
    }

    /// Register a member and subscribe to its dirty flag.
    ///
    /// Intended for construction-time population only. An already-dirty
    /// member marks the aggregate dirty right away.
    pub fn add_member(&self, member: impl Trackable + 'static) {
        let handle: Rc<dyn Trackable> = Rc::new(member);
        let weak = Rc::downgrade(&self.inner);
        let dirty = self.dirty.clone();
        let subscription = handle.dirty_signal().subscribe(move |member_dirty| {
            if *member_dirty {
                dirty.set(true);
            } else if let Some(inner) = weak.upgrade() {
                // Last-dirty-contributor rule: only clear after confirming
                // no other member remains dirty.
                let any_dirty = inner.borrow().members.iter().any(|m| m.handle.is_dirty());
                if !any_dirty {
                    dirty.set(false);
                }
            }
        });
        if handle.is_dirty() {
            self.dirty.set(true);
        }
        self.inner.borrow_mut().members.push(Member {
            handle,
            subscription,
        });
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Rebaseline every currently-dirty member, then clear the flag.
    ///
    /// Clean members are left untouched; a second call is a no-op.
    pub fn rebaseline(&self) {
        for member in self.dirty_members() {
            member.rebaseline();
        }
        self.dirty.set(false);
    }

    /// Reset every currently-dirty member, then clear the flag.
    pub fn reset(&self) {
        for member in self.dirty_members() {
            member.reset();
        }
        self.dirty.set(false);
    }

    pub fn dirty_signal(&self) -> Signal<bool> {
        self.dirty.signal()
    }

    // Snapshot first: member rebaseline/reset fires our own listener, which
    // must not find the member list borrowed.
    fn dirty_members(&self) -> Vec<Rc<dyn Trackable>> {
        self.inner
            .borrow()
            .members
            .iter()
            .filter(|m| m.handle.is_dirty())
            .map(|m| Rc::clone(&m.handle))
            .collect()
    }
}

impl Trackable for DirtyAggregate {
    fn is_dirty(&self) -> bool {
        DirtyAggregate::is_dirty(self)
    }

    fn rebaseline(&self) {
        DirtyAggregate::rebaseline(self)
    }

    fn reset(&self) {
        DirtyAggregate::reset(self)
    }

    fn dirty_signal(&self) -> Signal<bool> {
        DirtyAggregate::dirty_signal(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DirtyValue;

    fn aggregate_of(values: &[&DirtyValue<i32>]) -> DirtyAggregate {
        let aggregate = DirtyAggregate::new();
        for value in values {
            aggregate.add_member((*value).clone());
        }
        aggregate
    }

    #[test]
    fn clean_aggregate_over_clean_members() {
        let a = DirtyValue::new(1);
        let b = DirtyValue::new(2);
        let aggregate = aggregate_of(&[&a, &b]);
        assert!(!aggregate.is_dirty());
    }

    #[test]
    fn member_becoming_dirty_marks_aggregate() {
        let a = DirtyValue::new(1);
        let aggregate = aggregate_of(&[&a]);
        a.set(5);
        assert!(aggregate.is_dirty());
    }

    #[test]
    fn already_dirty_member_marks_aggregate_on_add() {
        let a = DirtyValue::new(1);
        a.set(2);
        let aggregate = aggregate_of(&[&a]);
        assert!(aggregate.is_dirty());
    }

    #[test]
    fn clearing_one_of_two_dirty_members_keeps_aggregate_dirty() {
        let a = DirtyValue::new(1);
        let b = DirtyValue::new(2);
        let aggregate = aggregate_of(&[&a, &b]);
        a.set(10);
        b.set(20);

        a.reset();
        assert!(aggregate.is_dirty(), "b is still dirty");
        b.reset();
        assert!(!aggregate.is_dirty(), "last dirty contributor cleared");
    }

    #[test]
    fn clear_order_does_not_change_final_state() {
        let a = DirtyValue::new(1);
        let b = DirtyValue::new(2);
        let aggregate = aggregate_of(&[&a, &b]);
        a.set(10);
        b.set(20);

        b.reset();
        assert!(aggregate.is_dirty());
        a.reset();
        assert!(!aggregate.is_dirty());
    }

    #[test]
    fn rebaseline_touches_only_dirty_members() {
        let a = DirtyValue::new(1);
        let b = DirtyValue::new(2);
        let aggregate = aggregate_of(&[&a, &b]);
        a.set(10);

        aggregate.rebaseline();
        assert!(!aggregate.is_dirty());
        assert_eq!(a.get(), 10);
        // b's baseline never moved; setting back to 2 stays clean.
        b.set(2);
        assert!(!aggregate.is_dirty());

        // Idempotent.
        aggregate.rebaseline();
        assert!(!aggregate.is_dirty());
    }

    #[test]
    fn reset_reverts_dirty_members() {
        let a = DirtyValue::new(1);
        let b = DirtyValue::new(2);
        let aggregate = aggregate_of(&[&a, &b]);
        a.set(10);
        b.set(20);

        aggregate.reset();
        assert!(!aggregate.is_dirty());
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
    }

    #[test]
    fn aggregates_nest() {
        let leaf = DirtyValue::new(1);
        let child = DirtyAggregate::new();
        child.add_member(leaf.clone());
        let parent = DirtyAggregate::new();
        parent.add_member(child.clone());

        leaf.set(2);
        assert!(child.is_dirty());
        assert!(parent.is_dirty());

        leaf.reset();
        assert!(!child.is_dirty());
        assert!(!parent.is_dirty());
    }
}
