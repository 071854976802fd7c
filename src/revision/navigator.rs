// ============================================================================
// Revision Navigator
// ============================================================================
//
// Point-in-time materialization plus reset ("time travel"): restore live
// content to a prior state while repairing references that have since
// become dangling. A reset returns the aggregate ready to be merged; the
// commit itself stays a separate caller-driven step so repairs can be
// batched first. History is never rewritten, the follow-up merge records a
// new revision.
//
// ============================================================================

use crate::content::course::Course;
use crate::content::exercise::Exercise;
use crate::content::version::{CourseVersion, ExerciseVersion};
use crate::copy::copy_or_skip;
use crate::core::error::{Result, RevisionError};
use crate::core::id::{EntityId, EntityRef, RevisionNumber};
use crate::storage::transaction::StoreTransaction;
use log::{debug, warn};

#[derive(Debug, Default)]
pub struct RevisionNavigator;

impl RevisionNavigator {
    pub fn new() -> Self {
        Self
    }

    /// Restores the given revision of a course as its newest state. The
    /// returned course keeps its persisted identity and must be merged by
    /// the caller.
    pub fn reset_course(
        &self,
        tx: &StoreTransaction,
        course_id: EntityId,
        revision: RevisionNumber,
    ) -> Result<Course> {
        let mut course = tx
            .log()
            .materialize_course(course_id, revision)?
            .into_content();
        course.meta_mut().touch();
        self.repair_content_provider(tx, &mut course);
        self.repair_course_resources(&mut course);
        Ok(course)
    }

    /// Restores the given revision of an exercise as its newest state. The
    /// returned exercise must be merged by the caller.
    pub fn reset_exercise(
        &self,
        tx: &StoreTransaction,
        exercise_id: EntityId,
        revision: RevisionNumber,
    ) -> Result<Exercise> {
        let mut exercise = tx
            .log()
            .materialize_exercise(exercise_id, revision)?
            .into_content();
        exercise.meta_mut().touch();
        self.repair_exercise_resources(&mut exercise);
        Ok(exercise)
    }

    /// A historical provider may reference an id that was superseded since
    /// that revision. Inserting such a graph would dangle, so the provider
    /// loses its old identity and is treated as brand-new content. A
    /// provider that still exists is reused unchanged.
    fn repair_content_provider(&self, tx: &StoreTransaction, course: &mut Course) {
        if let Some(provider) = course.content_provider_mut() {
            match provider.meta().storage_id() {
                Some(id) if tx.provider_exists(id) => {
                    debug!("Found exercise provider {id} in the store, updating it");
                }
                Some(id) => {
                    debug!(
                        "Exercise provider {id} is no longer in the store, inserting it as a new one"
                    );
                    provider.meta_mut().mark_transient();
                }
                None => {}
            }
        }
    }

    /// Resources materialized from history storage must not be reattached
    /// as-is; they are replaced by deep copies that the live aggregate can
    /// own.
    fn repair_course_resources(&self, course: &mut Course) {
        let resources = course.course_resources_mut();
        let copies = copy_or_skip(resources, "course resources restored from history");
        *resources = copies;
    }

    fn repair_exercise_resources(&self, exercise: &mut Exercise) {
        let resources = exercise.resources_mut();
        let copies = copy_or_skip(resources, "exercise resources restored from history");
        *resources = copies;
    }

    /// The revision number this course instance stands for, polymorphic
    /// over provenance:
    /// - live and persisted: the latest number from the log
    /// - frozen: its pinned proxied revision, no lookup
    /// - live but transient: the sentinel 0, with a warning
    /// - historical view: rejected, the caller already knows the number
    pub fn proxied_or_last_revision_course(
        &self,
        tx: &StoreTransaction,
        version: &CourseVersion,
    ) -> Result<RevisionNumber> {
        match version {
            CourseVersion::Live(course) => match course.id() {
                Some(id) => Ok(tx.log().latest(EntityRef::course(id))),
                None => {
                    warn!("Asked a transient course which revision it is, returning 0");
                    Ok(RevisionNumber::UNPERSISTED)
                }
            },
            CourseVersion::Frozen(frozen) => Ok(frozen.proxied_revision()),
            CourseVersion::Historical(historical) => {
                let entity = historical
                    .entity_id()
                    .map(EntityRef::course)
                    .ok_or_else(|| {
                        RevisionError::IllegalState("historical view without entity id".into())
                    })?;
                Err(RevisionError::HistoricalView(entity))
            }
        }
    }

    pub fn proxied_or_last_revision_exercise(
        &self,
        tx: &StoreTransaction,
        version: &ExerciseVersion,
    ) -> Result<RevisionNumber> {
        match version {
            ExerciseVersion::Live(exercise) => match exercise.id() {
                Some(id) => Ok(tx.log().latest(EntityRef::exercise(id))),
                None => {
                    warn!("Asked a transient exercise which revision it is, returning 0");
                    Ok(RevisionNumber::UNPERSISTED)
                }
            },
            ExerciseVersion::Frozen(frozen) => Ok(frozen.proxied_revision()),
            ExerciseVersion::Historical(historical) => {
                let entity = historical
                    .entity_id()
                    .map(EntityRef::exercise)
                    .ok_or_else(|| {
                        RevisionError::IllegalState("historical view without entity id".into())
                    })?;
                Err(RevisionError::HistoricalView(entity))
            }
        }
    }
}
