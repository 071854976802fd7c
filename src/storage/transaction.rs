// ============================================================================
// Store Transactions
// ============================================================================

use crate::content::course::Course;
use crate::content::exercise::Exercise;
use crate::content::frozen::{FrozenCourse, FrozenExercise};
use crate::content::usage::{CourseRef, ExerciseRef};
use crate::content::version::{CourseContent, CourseVersion, ExerciseVersion};
use crate::core::error::{Result, RevisionError};
use crate::core::id::{EntityId, EntityRef, RevisionNumber};
use crate::revision::log::RevisionLog;
use crate::revision::record::{ContentGraph, RevisionKind};
use crate::storage::store::StoreState;
use std::sync::Arc;

/// A unit of work against the store.
///
/// The transaction owns its own clone of the store state; every mutation
/// happens there. Merging an aggregate assigns storage identity on first
/// commit, stamps the author, and appends a revision iff the committed
/// graph differs from its stored predecessor.
#[derive(Debug)]
pub struct StoreTransaction {
    state: StoreState,
    author: Option<String>,
}

impl StoreTransaction {
    pub(crate) fn new(state: StoreState) -> Self {
        Self {
            state,
            author: None,
        }
    }

    pub(crate) fn into_state(self) -> StoreState {
        self.state
    }

    /// Author recorded on revisions and entity metadata written by this
    /// transaction.
    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = Some(author.into());
    }

    /// Read access to the revision ledger.
    pub fn log(&self) -> &RevisionLog {
        &self.state.log
    }

    // ------------------------------------------------------------------
    // Live aggregates
    // ------------------------------------------------------------------

    /// Commits a course: transient ones are persisted, known ones updated.
    /// Returns the merged course including its storage id.
    pub fn merge_course(&mut self, mut course: Course) -> Result<Course> {
        if course.is_transient() {
            let id = self.state.allocate_id();
            course.meta_mut().assign_storage_id(id);
        }
        let id = match course.id() {
            Some(id) => id,
            None => {
                return Err(RevisionError::IllegalState(
                    "course has no storage id after assignment".into(),
                ));
            }
        };
        if let Some(author) = self.author.clone() {
            course.meta_mut().set_updated_by(author);
        }
        for resource in course.course_resources_mut() {
            if resource.meta().is_transient() {
                let rid = self.state.allocate_id();
                resource.meta_mut().assign_storage_id(rid);
            }
        }
        self.register_provider(id, &mut course);

        self.state
            .log
            .append_if_changed(ContentGraph::Course(course.clone()), self.author.clone())?;
        self.state.courses.insert(id, Arc::new(course.clone()));
        Ok(course)
    }

    /// Commits an exercise; same contract as [`StoreTransaction::merge_course`].
    pub fn merge_exercise(&mut self, mut exercise: Exercise) -> Result<Exercise> {
        if exercise.is_transient() {
            let id = self.state.allocate_id();
            exercise.meta_mut().assign_storage_id(id);
        }
        let id = match exercise.id() {
            Some(id) => id,
            None => {
                return Err(RevisionError::IllegalState(
                    "exercise has no storage id after assignment".into(),
                ));
            }
        };
        if let Some(author) = self.author.clone() {
            exercise.meta_mut().set_updated_by(author);
        }
        for resource in exercise.resources_mut() {
            if resource.meta().is_transient() {
                let rid = self.state.allocate_id();
                resource.meta_mut().assign_storage_id(rid);
            }
        }

        self.state
            .log
            .append_if_changed(ContentGraph::Exercise(exercise.clone()), self.author.clone())?;
        self.state.exercises.insert(id, Arc::new(exercise.clone()));
        Ok(exercise)
    }

    /// Providers are interchangeable children with their own identity. A
    /// swap must supersede the old identity even when no course field
    /// changed, because a past revision's correctness depends on exactly
    /// which child content it pointed at.
    fn register_provider(&mut self, course_id: EntityId, course: &mut Course) {
        let previous = self
            .state
            .courses
            .get(&course_id)
            .and_then(|stored| stored.content_provider())
            .and_then(|provider| provider.meta().storage_id());

        let current = match course.content_provider_mut() {
            Some(provider) => {
                if provider.meta().is_transient() {
                    let pid = self.state.allocate_id();
                    provider.meta_mut().assign_storage_id(pid);
                }
                provider.meta().storage_id()
            }
            None => None,
        };

        if let Some(pid) = current {
            self.state.providers.insert(pid, course_id);
        }
        if let Some(old) = previous
            && current != Some(old)
        {
            self.state.providers.remove(&old);
        }
    }

    /// Records a revision of the course's current state regardless of
    /// whether anything changed. This is the deliberate audit capability;
    /// content merges never need it.
    pub fn record_course_revision(&mut self, id: EntityId) -> Result<RevisionNumber> {
        let graph = match self.state.courses.get(&id) {
            Some(course) => ContentGraph::Course((**course).clone()),
            None => return Err(RevisionError::NotFound(EntityRef::course(id))),
        };
        self.state
            .log
            .append(RevisionKind::Mod, graph, self.author.clone())
    }

    pub fn record_exercise_revision(&mut self, id: EntityId) -> Result<RevisionNumber> {
        let graph = match self.state.exercises.get(&id) {
            Some(exercise) => ContentGraph::Exercise((**exercise).clone()),
            None => return Err(RevisionError::NotFound(EntityRef::exercise(id))),
        };
        self.state
            .log
            .append(RevisionKind::Mod, graph, self.author.clone())
    }

    /// Hard-deletes a course and everything it owns. Frozen snapshots of
    /// the course are independent copies and stay untouched; history keeps
    /// the final state under a deletion revision.
    pub fn delete_course(&mut self, id: EntityId) -> Result<()> {
        let removed = self
            .state
            .courses
            .remove(&id)
            .ok_or(RevisionError::NotFound(EntityRef::course(id)))?;
        if let Some(pid) = removed
            .content_provider()
            .and_then(|provider| provider.meta().storage_id())
        {
            self.state.providers.remove(&pid);
        }
        self.state.log.append(
            RevisionKind::Del,
            ContentGraph::Course((*removed).clone()),
            self.author.clone(),
        )?;
        Ok(())
    }

    pub fn delete_exercise(&mut self, id: EntityId) -> Result<()> {
        let removed = self
            .state
            .exercises
            .remove(&id)
            .ok_or(RevisionError::NotFound(EntityRef::exercise(id)))?;
        self.state.log.append(
            RevisionKind::Del,
            ContentGraph::Exercise((*removed).clone()),
            self.author.clone(),
        )?;
        Ok(())
    }

    pub fn find_course(&self, id: EntityId) -> Option<Course> {
        self.state.courses.get(&id).map(|c| (**c).clone())
    }

    pub fn find_exercise(&self, id: EntityId) -> Option<Exercise> {
        self.state.exercises.get(&id).map(|e| (**e).clone())
    }

    pub fn provider_exists(&self, id: EntityId) -> bool {
        self.state.providers.contains_key(&id)
    }

    // ------------------------------------------------------------------
    // Frozen snapshots
    // ------------------------------------------------------------------

    /// Persists a frozen course under its own identity, or updates its
    /// bookkeeping fields if it is already persisted.
    pub fn merge_frozen_course(&mut self, mut frozen: FrozenCourse) -> Result<FrozenCourse> {
        if frozen.meta().is_transient() {
            let id = self.state.allocate_id();
            frozen.meta_mut().assign_storage_id(id);
        }
        let id = match frozen.id() {
            Some(id) => id,
            None => {
                return Err(RevisionError::IllegalState(
                    "frozen course has no storage id after assignment".into(),
                ));
            }
        };
        if let Some(author) = self.author.clone() {
            frozen.meta_mut().set_updated_by(author);
        }
        self.state.frozen_courses.insert(id, Arc::new(frozen.clone()));
        Ok(frozen)
    }

    pub fn merge_frozen_exercise(&mut self, mut frozen: FrozenExercise) -> Result<FrozenExercise> {
        if frozen.meta().is_transient() {
            let id = self.state.allocate_id();
            frozen.meta_mut().assign_storage_id(id);
        }
        let id = match frozen.id() {
            Some(id) => id,
            None => {
                return Err(RevisionError::IllegalState(
                    "frozen exercise has no storage id after assignment".into(),
                ));
            }
        };
        if let Some(author) = self.author.clone() {
            frozen.meta_mut().set_updated_by(author);
        }
        self.state
            .frozen_exercises
            .insert(id, Arc::new(frozen.clone()));
        Ok(frozen)
    }

    pub(crate) fn insert_frozen_course(&mut self, frozen: FrozenCourse) -> Result<FrozenCourse> {
        self.merge_frozen_course(frozen)
    }

    pub(crate) fn insert_frozen_exercise(
        &mut self,
        frozen: FrozenExercise,
    ) -> Result<FrozenExercise> {
        self.merge_frozen_exercise(frozen)
    }

    /// Deletes a snapshot. Callers do this once no usage context
    /// references it anymore.
    pub fn delete_frozen_course(&mut self, id: EntityId) -> Result<()> {
        self.state
            .frozen_courses
            .remove(&id)
            .map(|_| ())
            .ok_or(RevisionError::NotFound(EntityRef::course(id)))
    }

    pub fn delete_frozen_exercise(&mut self, id: EntityId) -> Result<()> {
        self.state
            .frozen_exercises
            .remove(&id)
            .map(|_| ())
            .ok_or(RevisionError::NotFound(EntityRef::exercise(id)))
    }

    pub fn find_frozen_course(&self, id: EntityId) -> Option<FrozenCourse> {
        self.state.frozen_courses.get(&id).map(|f| (**f).clone())
    }

    pub fn find_frozen_exercise(&self, id: EntityId) -> Option<FrozenExercise> {
        self.state.frozen_exercises.get(&id).map(|f| (**f).clone())
    }

    /// All frozen revisions of a course, oldest pinned revision first.
    pub fn frozen_courses_for(&self, proxied_course_id: EntityId) -> Vec<FrozenCourse> {
        let mut frozen: Vec<FrozenCourse> = self
            .state
            .frozen_courses
            .values()
            .filter(|f| f.proxied_course_id() == proxied_course_id)
            .map(|f| (**f).clone())
            .collect();
        frozen.sort_by_key(|f| f.proxied_revision());
        frozen
    }

    pub fn frozen_exercises_for(&self, proxied_exercise_id: EntityId) -> Vec<FrozenExercise> {
        let mut frozen: Vec<FrozenExercise> = self
            .state
            .frozen_exercises
            .values()
            .filter(|f| f.proxied_exercise_id() == proxied_exercise_id)
            .map(|f| (**f).clone())
            .collect();
        frozen.sort_by_key(|f| f.proxied_revision());
        frozen
    }

    pub fn find_frozen_course_by_proxied(
        &self,
        proxied_course_id: EntityId,
        proxied_revision: RevisionNumber,
    ) -> Option<FrozenCourse> {
        self.state
            .frozen_courses
            .values()
            .find(|f| {
                f.proxied_course_id() == proxied_course_id
                    && f.proxied_revision() == proxied_revision
            })
            .map(|f| (**f).clone())
    }

    // ------------------------------------------------------------------
    // Usage contexts
    // ------------------------------------------------------------------

    /// Resolves a usage-context reference. A live reference yields the
    /// current head, a frozen reference always yields the same pinned
    /// snapshot.
    pub fn resolve_course_ref(&self, course_ref: &CourseRef) -> Result<CourseVersion> {
        match course_ref {
            CourseRef::Live(id) => self
                .find_course(*id)
                .map(CourseVersion::Live)
                .ok_or(RevisionError::NotFound(EntityRef::course(*id))),
            CourseRef::Frozen(id) => self
                .find_frozen_course(*id)
                .map(CourseVersion::Frozen)
                .ok_or(RevisionError::NotFound(EntityRef::course(*id))),
        }
    }

    pub fn resolve_exercise_ref(&self, exercise_ref: &ExerciseRef) -> Result<ExerciseVersion> {
        match exercise_ref {
            ExerciseRef::Live(id) => self
                .find_exercise(*id)
                .map(ExerciseVersion::Live)
                .ok_or(RevisionError::NotFound(EntityRef::exercise(*id))),
            ExerciseRef::Frozen(id) => self
                .find_frozen_exercise(*id)
                .map(ExerciseVersion::Frozen)
                .ok_or(RevisionError::NotFound(EntityRef::exercise(*id))),
        }
    }
}
