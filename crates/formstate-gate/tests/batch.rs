//! Batch save/discard semantics.

mod common;

use common::{MemoryStore, NoteRecord};
use formstate_core::{DirtyCollection, Trackable};
use formstate_gate::{Editable, discard_all, save_all};

fn collection_of(records: &[NoteRecord]) -> DirtyCollection<NoteRecord> {
    let collection = DirtyCollection::new();
    for record in records {
        collection.add(record.clone());
    }
    collection
}

#[test]
fn middle_failure_does_not_abort_the_batch() {
    let first = NoteRecord::persisted(1, "a");
    let second = NoteRecord::persisted(2, "b");
    let third = NoteRecord::persisted(3, "c");
    let collection = collection_of(&[first.clone(), second.clone(), third.clone()]);

    first.title.set("a2".to_string());
    second.title.set("broken".to_string());
    third.title.set("c2".to_string());

    let mut store = MemoryStore {
        reject_titles: vec!["broken".to_string()],
        ..MemoryStore::default()
    };
    let report = save_all(&collection, &mut store);

    assert_eq!(report.attempted, 3);
    assert_eq!(report.saved, 2);
    assert_eq!(report.failures.len(), 1, "one failure per failing item");
    assert_eq!(report.failures[0].index, 1);

    assert!(!first.is_dirty());
    assert!(second.is_dirty(), "failed row keeps its dirty state");
    assert!(!third.is_dirty());
    assert!(collection.is_dirty(), "failed row keeps the list dirty");
    assert_eq!(
        store.saved,
        vec![(1, "a2".to_string()), (3, "c2".to_string())]
    );
}

#[test]
fn batch_report_snapshot() {
    let first = NoteRecord::persisted(1, "a");
    let second = NoteRecord::persisted(2, "b");
    let third = NoteRecord::persisted(3, "c");
    let collection = collection_of(&[first.clone(), second.clone(), third.clone()]);

    first.title.set("a2".to_string());
    second.title.set("broken".to_string());
    third.title.set("c2".to_string());

    let mut store = MemoryStore {
        reject_titles: vec!["broken".to_string()],
        ..MemoryStore::default()
    };
    let report = save_all(&collection, &mut store);
    insta::assert_json_snapshot!(report);
}

#[test]
fn invalid_dirty_elements_are_skipped_not_failed() {
    let valid = NoteRecord::persisted(1, "a");
    let invalid = NoteRecord::persisted(2, "b");
    let collection = collection_of(&[valid.clone(), invalid.clone()]);

    valid.title.set("a2".to_string());
    invalid.title.set("b2".to_string());
    invalid.set_valid(false);

    let mut store = MemoryStore::default();
    let report = save_all(&collection, &mut store);

    assert_eq!(report.attempted, 2);
    assert_eq!(report.saved, 1);
    assert_eq!(report.skipped_invalid, 1);
    assert!(!report.has_failures());
    assert!(invalid.is_dirty(), "skipped row stays dirty");
}

#[test]
fn clean_elements_are_not_persisted_again() {
    let edited = NoteRecord::persisted(1, "a");
    let untouched = NoteRecord::persisted(2, "b");
    let collection = collection_of(&[edited.clone(), untouched.clone()]);
    edited.title.set("a2".to_string());

    let mut store = MemoryStore::default();
    let report = save_all(&collection, &mut store);

    assert_eq!(report.attempted, 1);
    assert_eq!(store.saved.len(), 1);
}

#[test]
fn batch_save_assigns_ids_to_transient_elements() {
    let draft = NoteRecord::transient("draft");
    let collection = collection_of(&[draft.clone()]);
    draft.title.set("ready".to_string());

    let mut store = MemoryStore::default();
    let report = save_all(&collection, &mut store);

    assert_eq!(report.saved, 1);
    assert_eq!(draft.id(), Some(1));
    assert!(!draft.is_transient());
}

#[test]
fn discard_all_removes_transient_and_resets_persisted() {
    let draft = NoteRecord::transient("draft");
    let saved = NoteRecord::persisted(7, "a");
    let clean = NoteRecord::persisted(8, "x");
    let collection = collection_of(&[draft.clone(), saved.clone(), clean.clone()]);

    draft.title.set("scratch".to_string());
    saved.title.set("b".to_string());

    let discarded = discard_all(&collection);

    assert_eq!(discarded, 2);
    assert_eq!(collection.len(), 2, "transient row disappeared");
    assert!(!collection.contains(&draft));
    assert_eq!(saved.title.get(), "a");
    assert!(!collection.is_dirty());
}
