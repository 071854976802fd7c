// ============================================================================
// Content Store
// ============================================================================
//
// In-memory persistence and transaction collaborator. All four revision
// operations (append, materialize, freeze, reset) run inside one
// transaction boundary supplied by the caller: the closure passed to
// `transaction` works on a cheap structural-sharing clone of the whole
// store state and the state is published atomically on success. A failing
// closure leaves no trace - no half-created revision, no partially
// attached snapshot.
//
// Single-writer-per-aggregate assumption: concurrent transactions race at
// the publish step, last commit wins, each successful commit records its
// own revisions.
//
// ============================================================================

use crate::content::course::Course;
use crate::content::exercise::Exercise;
use crate::content::frozen::{FrozenCourse, FrozenExercise};
use crate::core::error::Result;
use crate::core::id::{EntityId, TxId};
use crate::revision::log::RevisionLog;
use crate::storage::transaction::StoreTransaction;
use std::sync::Arc;
use std::sync::RwLock;
use tracing::{Level, event, info_span};

/// The complete store state. Cloning is cheap: the maps and the revision
/// ledger share structure with the original.
#[derive(Debug, Clone, Default)]
pub(crate) struct StoreState {
    pub(crate) next_id: u64,
    pub(crate) courses: im::HashMap<EntityId, Arc<Course>>,
    pub(crate) exercises: im::HashMap<EntityId, Arc<Exercise>>,
    /// Provider id -> owning course id, for dangling-reference checks.
    pub(crate) providers: im::HashMap<EntityId, EntityId>,
    pub(crate) frozen_courses: im::HashMap<EntityId, Arc<FrozenCourse>>,
    pub(crate) frozen_exercises: im::HashMap<EntityId, Arc<FrozenExercise>>,
    pub(crate) log: RevisionLog,
}

impl StoreState {
    pub(crate) fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId::new(self.next_id)
    }
}

/// The in-memory content store.
#[derive(Debug, Default)]
pub struct ContentStore {
    state: RwLock<StoreState>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` inside one transaction boundary. On `Ok` the transaction's
    /// state is published atomically; on `Err` it is dropped entirely.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut StoreTransaction) -> Result<T>,
    ) -> Result<T> {
        let span = info_span!("content_tx", tx = %TxId::new());
        let _guard = span.enter();

        let snapshot = self.state.read()?.clone();
        let mut tx = StoreTransaction::new(snapshot);

        match f(&mut tx) {
            Ok(value) => {
                *self.state.write()? = tx.into_state();
                event!(Level::DEBUG, "transaction committed");
                Ok(value)
            }
            Err(err) => {
                event!(Level::DEBUG, error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }

    /// Runs `f` against a read-only snapshot of the store. Nothing is
    /// published, even if `f` mutates its transaction.
    pub fn read<T>(&self, f: impl FnOnce(&StoreTransaction) -> Result<T>) -> Result<T> {
        let snapshot = self.state.read()?.clone();
        let tx = StoreTransaction::new(snapshot);
        f(&tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::version::CourseContent;
    use crate::core::error::RevisionError;
    use crate::core::id::EntityRef;

    #[test]
    fn test_merge_assigns_an_id() {
        let store = ContentStore::new();
        let course = store
            .transaction(|tx| tx.merge_course(Course::new("Analysis I")))
            .unwrap();
        assert!(course.id().is_some());
    }

    #[test]
    fn test_failed_transaction_leaves_no_trace() {
        let store = ContentStore::new();
        let result: Result<()> = store.transaction(|tx| {
            tx.merge_course(Course::new("Analysis I"))?;
            Err(RevisionError::IllegalState("forced failure".into()))
        });
        assert!(result.is_err());

        store
            .read(|tx| {
                assert!(tx.log().numbers_for(EntityRef::course(EntityId::new(1))).is_empty());
                assert!(tx.find_course(EntityId::new(1)).is_none());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_unchanged_merge_records_no_revision() {
        let store = ContentStore::new();
        let course = store
            .transaction(|tx| tx.merge_course(Course::new("Analysis I")))
            .unwrap();
        let entity = course.entity_ref().unwrap();

        let merged = store.transaction(|tx| tx.merge_course(course)).unwrap();
        assert_eq!(merged.name(), "Analysis I");

        store
            .read(|tx| {
                assert_eq!(tx.log().numbers_for(entity).len(), 1);
                Ok(())
            })
            .unwrap();
    }
}
