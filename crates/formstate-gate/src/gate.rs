//! Per-selection operation gating.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use formstate_core::{DirtyCollection, Observable, Signal, Subscription};
use tracing::{debug, warn};

use crate::entity::Editable;
use crate::store::{Result, Store};

struct Selected<E: Editable> {
    entity: E,
    dirty_subscription: Subscription,
    valid_subscription: Subscription,
}

struct Selection<E: Editable> {
    selected: Option<Selected<E>>,
}

impl<E: Editable> Selection<E> {
    fn detach(&mut self) -> Option<E> {
        let selected = self.selected.take()?;
        selected
            .entity
            .dirty_signal()
            .unsubscribe(selected.dirty_subscription);
        selected
            .entity
            .valid_signal()
            .unsubscribe(selected.valid_subscription);
        Some(selected.entity)
    }
}

impl<E: Editable> Drop for Selection<E> {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Derives which user commands are permitted for the selected entity.
///
/// The gate owns a handle to the collection the entity list view shows and
/// an optional selection. Three independent gates are recomputed fresh on
/// every selection, dirty, or validity change:
///
/// - delete: an entity is selected;
/// - save: selected, dirty, and valid;
/// - discard: selected and dirty.
///
/// Selecting re-subscribes the gate's listeners from the previously
/// selected entity's signals to the new one's, so exactly one entity is
/// observed at a time.
///
/// All state is single-threaded; a long-running persist or delete must
/// marshal its completion back before calling into the gate. There is no
/// cancellation of an in-flight operation.
pub struct OperationGate<E: Editable> {
    collection: DirtyCollection<E>,
    selection: Rc<RefCell<Selection<E>>>,
    save_enabled: Observable<bool>,
    discard_enabled: Observable<bool>,
    delete_enabled: Observable<bool>,
}

impl<E: Editable> fmt::Debug for OperationGate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationGate")
            .field("selected", &self.selection.borrow().selected.is_some())
            .field("save_enabled", &self.save_enabled)
            .field("discard_enabled", &self.discard_enabled)
            .field("delete_enabled", &self.delete_enabled)
            .finish()
    }
}

impl<E: Editable + 'static> OperationGate<E> {
    /// Create a gate over the collection that owns the listed entities.
    /// Nothing is selected initially; all gates start closed.
    pub fn new(collection: DirtyCollection<E>) -> Self {
        Self {
            collection,
            selection: Rc::new(RefCell::new(Selection { selected: None })),
            save_enabled: Observable::new(false),
            discard_enabled: Observable::new(false),
            delete_enabled: Observable::new(false),
        }
    }

    pub fn collection(&self) -> &DirtyCollection<E> {
        &self.collection
    }

    pub fn selected(&self) -> Option<E> {
        self.selection
            .borrow()
            .selected
            .as_ref()
            .map(|s| s.entity.clone())
    }

    /// Change the selection, moving the gate's listeners to `entity`.
    pub fn select(&self, entity: Option<E>) {
        self.selection.borrow_mut().detach();
        if let Some(entity) = entity {
            let dirty_subscription = entity.dirty_signal().subscribe(self.recompute_listener());
            let valid_subscription = entity.valid_signal().subscribe(self.recompute_listener());
            self.selection.borrow_mut().selected = Some(Selected {
                entity,
                dirty_subscription,
                valid_subscription,
            });
        }
        recompute(
            &self.selection,
            &self.save_enabled,
            &self.discard_enabled,
            &self.delete_enabled,
        );
    }

    pub fn can_save(&self) -> bool {
        self.save_enabled.get()
    }

    pub fn can_discard(&self) -> bool {
        self.discard_enabled.get()
    }

    pub fn can_delete(&self) -> bool {
        self.delete_enabled.get()
    }

    pub fn save_enabled(&self) -> Signal<bool> {
        self.save_enabled.signal()
    }

    pub fn discard_enabled(&self) -> Signal<bool> {
        self.discard_enabled.signal()
    }

    pub fn delete_enabled(&self) -> Signal<bool> {
        self.delete_enabled.signal()
    }

    /// Persist the selected entity.
    ///
    /// No-op while the save gate is closed. On success a transient entity
    /// receives the identifier the store allocated, then the entity is
    /// rebaselined. On failure the error is returned and the entity's dirty
    /// state is left exactly as it was, so the user can retry or discard.
    pub fn save<S: Store<E>>(&self, store: &mut S) -> Result<()> {
        if !self.can_save() {
            debug!("save ignored: gate closed");
            return Ok(());
        }
        let Some(entity) = self.selected() else {
            return Ok(());
        };
        let was_transient = entity.is_transient();
        match store.persist(&entity) {
            Ok(id) => {
                if was_transient {
                    entity.assign_id(id);
                }
                entity.rebaseline();
                debug!(was_transient, "save complete");
                Ok(())
            }
            Err(error) => {
                warn!(%error, "persist failed; dirty state kept");
                Err(error)
            }
        }
    }

    /// Throw away the selected entity's unsaved edits.
    ///
    /// No-op while the discard gate is closed. A transient entity was never
    /// persisted, so discarding removes the row from the owning collection
    /// and clears the selection; a persisted entity is reset to its
    /// baseline and stays selected.
    pub fn discard(&self) {
        if !self.can_discard() {
            debug!("discard ignored: gate closed");
            return;
        }
        let Some(entity) = self.selected() else {
            return;
        };
        if entity.is_transient() {
            debug!("discarding transient entity: removing row");
            self.collection.remove(&entity);
            self.select(None);
        } else {
            debug!("discarding edits: reset to baseline");
            entity.reset();
        }
    }

    /// Delete the selected entity from persistence.
    ///
    /// No-op while the delete gate is closed. On success the entity leaves
    /// the owning collection and the selection is cleared; on failure the
    /// row stays present and selected.
    pub fn remove<S: Store<E>>(&self, store: &mut S) -> Result<()> {
        if !self.can_delete() {
            debug!("delete ignored: gate closed");
            return Ok(());
        }
        let Some(entity) = self.selected() else {
            return Ok(());
        };
        match store.delete(&entity) {
            Ok(()) => {
                self.collection.remove(&entity);
                self.select(None);
                debug!("delete complete");
                Ok(())
            }
            Err(error) => {
                warn!(%error, "delete failed; row kept");
                Err(error)
            }
        }
    }

    fn recompute_listener(&self) -> impl Fn(&bool) + 'static {
        let selection = Rc::downgrade(&self.selection);
        let save = self.save_enabled.clone();
        let discard = self.discard_enabled.clone();
        let delete = self.delete_enabled.clone();
        move |_| {
            if let Some(selection) = selection.upgrade() {
                recompute(&selection, &save, &discard, &delete);
            }
        }
    }
}

fn recompute<E: Editable>(
    selection: &Rc<RefCell<Selection<E>>>,
    save: &Observable<bool>,
    discard: &Observable<bool>,
    delete: &Observable<bool>,
) {
    let state = {
        let selection = selection.borrow();
        selection
            .selected
            .as_ref()
            .map(|s| (s.entity.is_dirty(), s.entity.is_valid()))
    };
    match state {
        Some((dirty, valid)) => {
            delete.set(true);
            save.set(dirty && valid);
            discard.set(dirty);
        }
        None => {
            delete.set(false);
            save.set(false);
            discard.set(false);
        }
    }
}
