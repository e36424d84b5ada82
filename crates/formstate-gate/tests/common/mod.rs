//! Shared fixtures: a minimal editable record and an in-memory store.

use formstate_core::{DirtyValue, Signal, Trackable};
use formstate_gate::{Editable, EntityCore, Store, StoreError};

/// One-field record used across the gate and batch tests.
#[derive(Clone)]
pub struct NoteRecord {
    core: EntityCore<u64>,
    pub title: DirtyValue<String>,
}

impl NoteRecord {
    pub fn transient(title: &str) -> Self {
        Self::build(EntityCore::transient(), title)
    }

    pub fn persisted(id: u64, title: &str) -> Self {
        Self::build(EntityCore::persisted(id), title)
    }

    fn build(core: EntityCore<u64>, title: &str) -> Self {
        let title = DirtyValue::new(title.to_string());
        core.add_field(title.clone());
        Self { core, title }
    }

    pub fn set_valid(&self, valid: bool) {
        self.core.set_valid(valid);
    }
}

impl Trackable for NoteRecord {
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

impl Editable for NoteRecord {
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

/// In-memory store with title-based failure injection.
#[derive(Default)]
pub struct MemoryStore {
    pub next_id: u64,
    pub saved: Vec<(u64, String)>,
    pub deleted: Vec<u64>,
    pub reject_titles: Vec<String>,
    pub fail_deletes: bool,
}

impl Store<NoteRecord> for MemoryStore {
    fn persist(&mut self, entity: &NoteRecord) -> Result<u64, StoreError> {
        let title = entity.title.get();
        if self.reject_titles.contains(&title) {
            return Err(StoreError::Rejected(format!("title {title:?} not allowed")));
        }
        let id = match entity.id() {
            Some(id) => id,
            None => {
                self.next_id += 1;
                self.next_id
            }
        };
        self.saved.push((id, title));
        Ok(id)
    }

    fn delete(&mut self, entity: &NoteRecord) -> Result<(), StoreError> {
        if self.fail_deletes {
            return Err(StoreError::Message("backend unavailable".to_string()));
        }
        if let Some(id) = entity.id() {
            self.deleted.push(id);
        }
        Ok(())
    }
}
