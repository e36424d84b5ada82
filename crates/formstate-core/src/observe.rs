//! Change-notification plumbing shared by every tracked cell.
//!
//! [`Observable`] is a shared single-threaded value cell: clones point at
//! the same state, `set` notifies subscribers only when the value actually
//! changes, and subscriptions are detached explicitly with the token
//! returned by `subscribe`. [`Signal`] is the read-only view handed to
//! consumers that must not write the cell.
//!
//! # Invariants
//! - Listeners run after the interior borrow is released, so a listener may
//!   read, set, subscribe, or unsubscribe reentrantly.
//! - Each notification round runs against a snapshot of the listener list:
//!   a listener detached mid-round is still delivered that round's value,
//!   and only drops out of subsequent rounds.
//! - `Rc`-based sharing makes every cell `!Send`; mutation from a second
//!   thread is ruled out at compile time.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Token identifying one listener registration on one cell.
///
/// Unsubscribing a token that was already removed is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

pub(crate) type Listener<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: T,
    next_token: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// Shared mutable value cell with change notification.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observable")
            .field(&self.inner.borrow().value)
            .finish()
    }
}

impl<T: PartialEq + Clone> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                next_token: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Current value (cloned out of the cell).
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Store `value` and notify subscribers.
    ///
    /// Comparing equal to the stored value is a no-op: nothing is written
    /// and nobody is notified. Listeners receive the value as it was when
    /// this call stored it; a listener that mutates the cell again should
    /// re-read with [`get`](Self::get) rather than trust the argument.
    ///
    /// The listener list is snapshotted when the value is stored: a
    /// listener unsubscribed by an earlier listener in the same
    /// notification round is still delivered that round's value once.
    pub fn set(&self, value: T) {
        let to_notify = self.stage(value.clone());
        for listener in to_notify {
            listener(&value);
        }
    }

    /// Store `value` without notifying; returns the listeners to run.
    ///
    /// Lets a caller that derives one cell from another bring both cells
    /// up to date before delivering either cell's notifications.
    pub(crate) fn stage(&self, value: T) -> Vec<Listener<T>> {
        let mut inner = self.inner.borrow_mut();
        if inner.value == value {
            return Vec::new();
        }
        inner.value = value;
        inner.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
    }

    /// Register `listener` to run after every effective [`set`](Self::set).
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let token = inner.next_token;
        inner.next_token += 1;
        inner.listeners.push((token, Rc::new(listener)));
        Subscription(token)
    }

    /// Detach the listener registered under `subscription`.
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.inner
            .borrow_mut()
            .listeners
            .retain(|(token, _)| *token != subscription.0);
    }

    /// Read-only view onto this cell.
    pub fn signal(&self) -> Signal<T> {
        Signal {
            observable: self.clone(),
        }
    }
}

/// Read-and-subscribe view of an [`Observable`]; cannot write the cell.
pub struct Signal<T> {
    observable: Observable<T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            observable: self.observable.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signal")
            .field(&self.observable.inner.borrow().value)
            .finish()
    }
}

impl<T: PartialEq + Clone> Signal<T> {
    pub fn get(&self) -> T {
        self.observable.get()
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.observable.subscribe(listener)
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.observable.unsubscribe(subscription)
    }

    /// True when both views point at the same underlying cell.
    ///
    /// Used as the identity of a tracked element: every tracked cell owns
    /// exactly one dirty-flag cell for its whole lifetime.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.observable.inner, &other.observable.inner)
    }
}
