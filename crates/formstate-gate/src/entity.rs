//! Entity abstractions: the detail model the gate operates on.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use formstate_core::{DirtyAggregate, Observable, Signal, Trackable};

/// A dirty-tracked record the gate can save, discard, and delete.
///
/// Implementors are shared handles (clones point at the same record), carry
/// a nullable persistent identifier, and expose a validity flag computed by
/// an external validation collaborator. `is_transient()` must hold exactly
/// when no identifier has been assigned yet.
pub trait Editable: Trackable + Clone {
    type Id: Clone;

    fn id(&self) -> Option<Self::Id>;

    /// Record the identifier handed back by a successful first persist.
    fn assign_id(&self, id: Self::Id);

    /// Validity as computed by the validation collaborator; never computed
    /// here.
    fn valid_signal(&self) -> Signal<bool>;

    fn is_valid(&self) -> bool {
        self.valid_signal().get()
    }

    fn is_transient(&self) -> bool {
        self.id().is_none()
    }
}

/// Reusable state for an [`Editable`] record.
///
/// Entity types embed one `EntityCore` and register their
/// [`DirtyValue`](formstate_core::DirtyValue) fields on it at construction:
///
/// ```
/// use formstate_core::DirtyValue;
/// use formstate_gate::EntityCore;
///
/// #[derive(Clone)]
/// struct Contact {
///     core: EntityCore<u64>,
///     name: DirtyValue<String>,
/// }
///
/// impl Contact {
///     fn new(name: &str) -> Self {
///         let core = EntityCore::transient();
///         let name = DirtyValue::new(name.to_string());
///         core.add_field(name.clone());
///         Self { core, name }
///     }
/// }
/// ```
///
/// Validity starts `true`: with no validator attached, no constraint is
/// violated. A validation collaborator takes ownership of the flag through
/// [`set_valid`](Self::set_valid).
pub struct EntityCore<Id> {
    id: Rc<RefCell<Option<Id>>>,
    fields: DirtyAggregate,
    valid: Observable<bool>,
}

impl<Id> Clone for EntityCore<Id> {
    fn clone(&self) -> Self {
        Self {
            id: Rc::clone(&self.id),
            fields: self.fields.clone(),
            valid: self.valid.clone(),
        }
    }
}

impl<Id: fmt::Debug> fmt::Debug for EntityCore<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCore")
            .field("id", &self.id.borrow())
            .field("fields", &self.fields)
            .field("valid", &self.valid)
            .finish()
    }
}

impl<Id: Clone> EntityCore<Id> {
    /// A never-persisted record: no identifier yet.
    pub fn transient() -> Self {
        Self::with_id(None)
    }

    /// A record loaded from persistence under `id`.
    pub fn persisted(id: Id) -> Self {
        Self::with_id(Some(id))
    }

    fn with_id(id: Option<Id>) -> Self {
        Self {
            id: Rc::new(RefCell::new(id)),
            fields: DirtyAggregate::new(),
            valid: Observable::new(true),
        }
    }

    pub fn id(&self) -> Option<Id> {
        self.id.borrow().clone()
    }

    pub fn assign_id(&self, id: Id) {
        *self.id.borrow_mut() = Some(id);
    }

    pub fn is_transient(&self) -> bool {
        self.id.borrow().is_none()
    }

    /// Register a dirty-tracked field. Construction-time only.
    pub fn add_field(&self, field: impl Trackable + 'static) {
        self.fields.add_member(field);
    }

    pub fn fields(&self) -> &DirtyAggregate {
        &self.fields
    }

    /// Written by the validation collaborator.
    pub fn set_valid(&self, valid: bool) {
        self.valid.set(valid);
    }

    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }

    pub fn valid_signal(&self) -> Signal<bool> {
        self.valid.signal()
    }
}

impl<Id: Clone> Trackable for EntityCore<Id> {
    fn is_dirty(&self) -> bool {
        self.fields.is_dirty()
    }

    fn rebaseline(&self) {
        self.fields.rebaseline()
    }

    fn reset(&self) {
        self.fields.reset()
    }

    fn dirty_signal(&self) -> Signal<bool> {
        self.fields.dirty_signal()
    }
}
