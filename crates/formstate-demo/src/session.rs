//! Scripted contact-book session over the tracking model.
//!
//! Plays the part of the view layer and of the validation collaborator:
//! edits write through `DirtyValue::set`, validity is recomputed after each
//! edit, and every operation goes through the gate exactly as a button
//! handler would.

use std::collections::BTreeMap;

use formstate_core::{DirtyCollection, DirtyValue, Signal, Trackable};
use formstate_gate::{
    BatchReport, Editable, EntityCore, OperationGate, Store, StoreError, discard_all, save_all,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Demo entity: a contact with two tracked fields.
#[derive(Clone)]
pub struct Contact {
    core: EntityCore<u64>,
    pub name: DirtyValue<String>,
    pub email: DirtyValue<String>,
}

impl Contact {
    /// A new, never-persisted contact.
    pub fn draft(name: &str, email: &str) -> Self {
        Self::build(EntityCore::transient(), name, email)
    }

    /// A contact loaded from the store.
    pub fn on_file(id: u64, name: &str, email: &str) -> Self {
        Self::build(EntityCore::persisted(id), name, email)
    }

    fn build(core: EntityCore<u64>, name: &str, email: &str) -> Self {
        let name = DirtyValue::new(name.to_string());
        let email = DirtyValue::new(email.to_string());
        core.add_field(name.clone());
        core.add_field(email.clone());
        Self { core, name, email }
    }

    /// The demo's stand-in for the validation collaborator: non-empty name
    /// and a plausible email.
    pub fn revalidate(&self) {
        let valid = !self.name.get().trim().is_empty() && self.email.get().contains('@');
        self.core.set_valid(valid);
    }
}

impl Trackable for Contact {
    fn is_dirty(&self) -> bool {
        self.core.is_dirty()
    }

    fn rebaseline(&self) {
        self.core.rebaseline()
    }

    fn reset(&self) {
        self.core.reset()
    }

    fn dirty_signal(&self) -> Signal<bool> {
        self.core.dirty_signal()
    }
}

impl Editable for Contact {
    type Id = u64;

    fn id(&self) -> Option<u64> {
        self.core.id()
    }

    fn assign_id(&self, id: u64) {
        self.core.assign_id(id)
    }

    fn valid_signal(&self) -> Signal<bool> {
        self.core.valid_signal()
    }
}

/// Persisted shape of a contact.
#[derive(Debug, Clone, Serialize)]
pub struct ContactRow {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// In-memory store with optional name-based failure injection.
#[derive(Default)]
pub struct MemoryStore {
    next_id: u64,
    fail_on: Option<String>,
    rows: BTreeMap<u64, ContactRow>,
}

impl MemoryStore {
    fn seeded(fail_on: Option<&str>, contacts: &[Contact]) -> Self {
        let mut store = Self {
            fail_on: fail_on.map(str::to_string),
            ..Self::default()
        };
        for contact in contacts {
            if let Some(id) = contact.id() {
                store.next_id = store.next_id.max(id);
                store.rows.insert(
                    id,
                    ContactRow {
                        id,
                        name: contact.name.get(),
                        email: contact.email.get(),
                    },
                );
            }
        }
        store
    }

    pub fn rows(&self) -> Vec<ContactRow> {
        self.rows.values().cloned().collect()
    }
}

impl Store<Contact> for MemoryStore {
    fn persist(&mut self, entity: &Contact) -> Result<u64, StoreError> {
        let name = entity.name.get();
        if let Some(tag) = &self.fail_on
            && name.contains(tag.as_str())
        {
            return Err(StoreError::Rejected(format!(
                "injected failure for {name:?}"
            )));
        }
        let id = match entity.id() {
            Some(id) => id,
            None => {
                self.next_id += 1;
                self.next_id
            }
        };
        self.rows.insert(
            id,
            ContactRow {
                id,
                name,
                email: entity.email.get(),
            },
        );
        Ok(id)
    }

    fn delete(&mut self, entity: &Contact) -> Result<(), StoreError> {
        match entity.id() {
            Some(id) => {
                self.rows.remove(&id);
                Ok(())
            }
            None => Err(StoreError::Message(
                "cannot delete a never-saved contact".to_string(),
            )),
        }
    }
}

/// What happened during one scripted session.
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub loaded: usize,
    pub saved: usize,
    pub save_failures: usize,
    pub discarded: usize,
    pub deleted: usize,
    pub batch: BatchReport,
    pub rows: Vec<ContactRow>,
}

impl SessionSummary {
    pub fn has_failures(&self) -> bool {
        self.save_failures > 0 || self.batch.has_failures()
    }
}

/// Run the scripted session. `fail_on` injects a persist failure for every
/// contact whose name contains the given text.
pub fn run(fail_on: Option<&str>) -> SessionSummary {
    let ada = Contact::on_file(1, "Ada Lovelace", "ada@example.org");
    let grace = Contact::on_file(2, "Grace Hopper", "grace@example.org");
    let edsger = Contact::on_file(3, "Edsger Dijkstra", "edsger@example.org");
    let mut store = MemoryStore::seeded(fail_on, &[ada.clone(), grace.clone(), edsger.clone()]);

    let list = DirtyCollection::new();
    for contact in [&ada, &grace, &edsger] {
        list.add(contact.clone());
    }
    let gate = OperationGate::new(list.clone());
    let loaded = list.len();
    info!(loaded, "session start");

    let mut saved = 0usize;
    let mut save_failures = 0usize;
    let mut discarded = 0usize;
    let mut deleted = 0usize;

    // Edit a persisted contact and save it.
    gate.select(Some(ada.clone()));
    ada.email.set("ada@example.com".to_string());
    ada.revalidate();
    debug!(
        save = gate.can_save(),
        discard = gate.can_discard(),
        delete = gate.can_delete(),
        "gates after edit"
    );
    match gate.save(&mut store) {
        Ok(()) => {
            saved += 1;
            info!(name = %ada.name.get(), "saved edit");
        }
        Err(error) => {
            save_failures += 1;
            warn!(%error, "save failed; contact stays dirty");
        }
    }

    // Create a draft, fill it in, save: the store assigns the id.
    let alan = Contact::draft("Alan Turing", "");
    list.add(alan.clone());
    gate.select(Some(alan.clone()));
    alan.email.set("alan@example.org".to_string());
    alan.revalidate();
    match gate.save(&mut store) {
        Ok(()) => {
            saved += 1;
            info!(id = ?alan.id(), "draft persisted");
        }
        Err(error) => {
            save_failures += 1;
            warn!(%error, "draft save failed");
        }
    }

    // Edit another persisted contact, then think better of it.
    gate.select(Some(grace.clone()));
    grace.name.set("Grace Murray Hopper".to_string());
    grace.revalidate();
    gate.discard();
    discarded += 1;
    info!(name = %grace.name.get(), "edit discarded, row kept");

    // A draft that never gets saved disappears on discard.
    let scratch = Contact::draft("Scratch", "scratch@example.org");
    list.add(scratch.clone());
    gate.select(Some(scratch.clone()));
    scratch.name.set("Scratch 2".to_string());
    scratch.revalidate();
    gate.discard();
    discarded += 1;
    info!(remaining = list.len(), "draft discarded, row removed");

    // Delete a persisted contact.
    gate.select(Some(edsger.clone()));
    if let Err(error) = gate.remove(&mut store) {
        warn!(%error, "delete failed; row kept");
    } else {
        deleted += 1;
    }

    // Batch: edit everything left, then save all at once.
    for contact in list.elements() {
        let name = contact.name.get();
        contact.name.set(format!("{name} (reviewed)"));
        contact.revalidate();
    }
    let batch = save_all(&list, &mut store);
    if batch.has_failures() {
        // Failed rows stay dirty; the user gives up on them here.
        let dropped = discard_all(&list);
        discarded += dropped;
        info!(dropped, "remaining dirty rows discarded");
    }

    info!(saved, save_failures, deleted, "session end");
    SessionSummary {
        loaded,
        saved,
        save_failures,
        discarded,
        deleted,
        batch,
        rows: store.rows(),
    }
}
