// ============================================================================
// Snapshot Freezer
// ============================================================================
//
// Materializes one revision of a content aggregate into a frozen snapshot:
// an independent deep copy persisted under its own identity, pinned to
// (proxied id, proxied revision). Frozen courses must only contain frozen
// exercises, so freezing a course rewrites its provider into a fixed list
// whose entries all pin a frozen exercise, creating missing ones on the
// spot.
//
// Freezing the same (id, revision) pair twice yields two independent
// snapshots; callers that want sharing query existing snapshots first.
//
// ============================================================================

use crate::content::frozen::{FrozenCourse, FrozenExercise};
use crate::content::provider::{CourseEntry, ExerciseProvider, ProviderKind};
use crate::copy::DeepCopy;
use crate::core::error::{Result, RevisionError};
use crate::core::id::{EntityId, EntityRef, RevisionNumber};
use crate::storage::transaction::StoreTransaction;
use log::warn;

#[derive(Debug, Default)]
pub struct SnapshotFreezer;

impl SnapshotFreezer {
    pub fn new() -> Self {
        Self
    }

    /// Freezes the given revision of an exercise and persists the snapshot.
    pub fn freeze_exercise(
        &self,
        tx: &mut StoreTransaction,
        exercise_id: EntityId,
        revision: RevisionNumber,
    ) -> Result<FrozenExercise> {
        if revision.is_unpersisted() {
            return Err(RevisionError::IllegalState(format!(
                "exercise {exercise_id} must be persisted before a frozen copy can be created"
            )));
        }
        let historical = tx.log().materialize_exercise(exercise_id, revision)?;
        let content = historical.content().deep_copy()?;
        tx.insert_frozen_exercise(FrozenExercise::new(content, exercise_id, revision))
    }

    /// Freezes the given revision of a course and persists the snapshot.
    pub fn freeze_course(
        &self,
        tx: &mut StoreTransaction,
        course_id: EntityId,
        revision: RevisionNumber,
    ) -> Result<FrozenCourse> {
        if revision.is_unpersisted() {
            return Err(RevisionError::IllegalState(format!(
                "course {course_id} must be persisted before a frozen copy can be created"
            )));
        }
        let historical = tx.log().materialize_course(course_id, revision)?;
        let mut content = historical.content().deep_copy()?;

        if let Some(provider) = content.take_content_provider() {
            content.set_content_provider(Some(self.freeze_provider(tx, provider)?));
        }

        tx.insert_frozen_course(FrozenCourse::new(content, course_id, revision))
    }

    /// Rewrites a provider so every entry pins a frozen exercise. Entries
    /// whose pinned snapshot still exists are reused unchanged; the rest
    /// get a fresh snapshot of the exercise's latest revision.
    fn freeze_provider(
        &self,
        tx: &mut StoreTransaction,
        provider: ExerciseProvider,
    ) -> Result<ExerciseProvider> {
        let entries = match provider.kind() {
            ProviderKind::FixedList { entries } => entries.clone(),
            ProviderKind::Folder { .. } => {
                return Err(RevisionError::IllegalState(
                    "frozen courses must pin a fixed exercise list; folder providers cannot be frozen"
                        .into(),
                ));
            }
        };

        let mut pinned = Vec::with_capacity(entries.len());
        for entry in entries {
            pinned.push(self.pin_entry(tx, entry)?);
        }
        Ok(ExerciseProvider::fixed_list(pinned))
    }

    fn pin_entry(&self, tx: &mut StoreTransaction, mut entry: CourseEntry) -> Result<CourseEntry> {
        let existing = entry
            .frozen_exercise_id
            .filter(|fid| tx.find_frozen_exercise(*fid).is_some());

        let frozen_id = match existing {
            Some(fid) => fid,
            None => {
                if entry.frozen_exercise_id.is_some() {
                    warn!(
                        "Frozen exercise pinned for exercise {} has been deleted, freezing again",
                        entry.exercise_id
                    );
                }
                let latest = tx.log().latest(EntityRef::exercise(entry.exercise_id));
                if latest.is_unpersisted() {
                    return Err(RevisionError::NotFound(EntityRef::exercise(entry.exercise_id)));
                }
                let frozen = self.freeze_exercise(tx, entry.exercise_id, latest)?;
                frozen.id().ok_or_else(|| {
                    RevisionError::IllegalState(
                        "freshly inserted frozen exercise has no storage id".into(),
                    )
                })?
            }
        };

        entry.frozen_exercise_id = Some(frozen_id);
        Ok(entry)
    }
}
