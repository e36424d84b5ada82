//! Bulk save/discard across a whole collection.
//!
//! Batches apply the same per-entity rules as the gate, element by element
//! in encounter order, and keep going past individual failures: one bad
//! record must not abort the rest of a "save all". Sequential on purpose,
//! so the collection's rescans never run under concurrent mutation.

use formstate_core::DirtyCollection;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::entity::Editable;
use crate::store::Store;

/// Outcome of one [`save_all`] run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Dirty elements present when the batch started.
    pub attempted: usize,
    /// Elements persisted and rebaselined.
    pub saved: usize,
    /// Dirty elements skipped because they were invalid; they stay dirty.
    pub skipped_invalid: usize,
    /// One entry per failed persist, in encounter order.
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// A persist failure inside a batch. The element keeps its dirty state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Position within the batch's dirty snapshot.
    pub index: usize,
    pub message: String,
}

/// Persist every currently-dirty, valid element of `collection`.
///
/// Works on a snapshot taken up front: elements dirtied while the batch
/// runs are not picked up. Successful persists assign the returned
/// identifier to transient elements and rebaseline; failures are logged,
/// collected into the report, and do not stop the batch.
pub fn save_all<E, S>(collection: &DirtyCollection<E>, store: &mut S) -> BatchReport
where
    E: Editable + 'static,
    S: Store<E>,
{
    let dirty = collection.dirty_elements();
    let mut report = BatchReport {
        attempted: dirty.len(),
        ..BatchReport::default()
    };
    for (index, entity) in dirty.iter().enumerate() {
        if !entity.is_valid() {
            debug!(index, "batch save: skipping invalid element");
            report.skipped_invalid += 1;
            continue;
        }
        let was_transient = entity.is_transient();
        match store.persist(entity) {
            Ok(id) => {
                if was_transient {
                    entity.assign_id(id);
                }
                entity.rebaseline();
                report.saved += 1;
            }
            Err(error) => {
                warn!(index, %error, "batch save: persist failed, continuing");
                report.failures.push(BatchFailure {
                    index,
                    message: error.to_string(),
                });
            }
        }
    }
    debug!(
        attempted = report.attempted,
        saved = report.saved,
        skipped = report.skipped_invalid,
        failed = report.failures.len(),
        "batch save finished"
    );
    report
}

/// Discard every currently-dirty element of `collection`.
///
/// Transient elements were never persisted and disappear from the
/// collection; persisted elements are reset to their baselines. Returns the
/// number of elements discarded.
pub fn discard_all<E>(collection: &DirtyCollection<E>) -> usize
where
    E: Editable + 'static,
{
    let dirty = collection.dirty_elements();
    let discarded = dirty.len();
    for entity in dirty {
        if entity.is_transient() {
            collection.remove(&entity);
        } else {
            entity.reset();
        }
    }
    debug!(discarded, "batch discard finished");
    discarded
}
