// ============================================================================
// Frozen Snapshots
// ============================================================================
//
// A frozen snapshot is an unmodifiable state of a course or exercise that
// lecturers and students rely on for traceability. It is a structurally
// independent deep copy of one revision, persisted under its own identity
// and pinned to (proxied entity id, proxied revision number). The copied
// content is private: there is no mutable access to it at all, only the
// small bookkeeping surface below (frozen title, editor stamp, timestamp
// bump, storage id assignment on insert).
//
// ============================================================================

use crate::content::catalog::{ContentFolder, Subject, Tag};
use crate::content::course::{Course, ExerciseOrder, ScoringMode};
use crate::content::exercise::{Exercise, HintMalus};
use crate::content::expression::ResultFeedbackMapping;
use crate::content::provider::ExerciseProvider;
use crate::content::resource::{CourseResource, ExerciseResource};
use crate::content::stage::Stage;
use crate::content::variable::VariableDeclaration;
use crate::content::version::{CourseContent, ExerciseContent};
use crate::core::id::{EntityId, RevisionNumber, StageId};
use crate::core::meta::EntityMeta;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An immutable copy of one course revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrozenCourse {
    meta: EntityMeta,
    proxied_course_id: EntityId,
    proxied_revision: RevisionNumber,
    frozen_title: Option<String>,
    content: Course,
}

impl FrozenCourse {
    pub(crate) fn new(
        content: Course,
        proxied_course_id: EntityId,
        proxied_revision: RevisionNumber,
    ) -> Self {
        Self {
            meta: EntityMeta::new(),
            proxied_course_id,
            proxied_revision,
            frozen_title: None,
            content,
        }
    }

    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    pub(crate) fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    /// The snapshot's own identity, distinct from the proxied course.
    pub fn id(&self) -> Option<EntityId> {
        self.meta.storage_id()
    }

    /// Id of the course this frozen copy belongs to.
    pub fn proxied_course_id(&self) -> EntityId {
        self.proxied_course_id
    }

    /// Revision of the course that was frozen into this snapshot.
    pub fn proxied_revision(&self) -> RevisionNumber {
        self.proxied_revision
    }

    pub fn frozen_title(&self) -> Option<&str> {
        self.frozen_title.as_deref()
    }

    /// Bookkeeping: the display title of the snapshot is not part of the
    /// frozen business data and may be set at any time.
    pub fn set_frozen_title(&mut self, title: impl Into<String>) {
        self.frozen_title = Some(title.into());
    }

    /// Bookkeeping: bump the snapshot's own update timestamp.
    pub fn touch(&mut self) {
        self.meta.touch();
    }
}

impl CourseContent for FrozenCourse {
    fn name(&self) -> &str {
        self.content.name()
    }

    fn external_description(&self) -> Option<&str> {
        self.content.external_description()
    }

    fn internal_description(&self) -> Option<&str> {
        self.content.internal_description()
    }

    fn language(&self) -> Option<&str> {
        self.content.language()
    }

    fn is_valid(&self) -> bool {
        self.content.is_valid()
    }

    fn scoring_mode(&self) -> ScoringMode {
        self.content.scoring_mode()
    }

    fn exercise_order(&self) -> ExerciseOrder {
        self.content.exercise_order()
    }

    fn content_provider(&self) -> Option<&ExerciseProvider> {
        self.content.content_provider()
    }

    fn course_resources(&self) -> &[CourseResource] {
        self.content.course_resources()
    }

    fn result_feedback_mappings(&self) -> &[ResultFeedbackMapping] {
        self.content.result_feedback_mappings()
    }

    fn folder(&self) -> Option<&Arc<ContentFolder>> {
        self.content.folder()
    }

    fn subject(&self) -> Option<&Arc<Subject>> {
        self.content.subject()
    }

    fn is_frozen(&self) -> bool {
        true
    }
}

/// An immutable copy of one exercise revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrozenExercise {
    meta: EntityMeta,
    proxied_exercise_id: EntityId,
    proxied_revision: RevisionNumber,
    frozen_title: Option<String>,
    content: Exercise,
}

impl FrozenExercise {
    pub(crate) fn new(
        content: Exercise,
        proxied_exercise_id: EntityId,
        proxied_revision: RevisionNumber,
    ) -> Self {
        Self {
            meta: EntityMeta::new(),
            proxied_exercise_id,
            proxied_revision,
            frozen_title: None,
            content,
        }
    }

    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    pub(crate) fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    pub fn id(&self) -> Option<EntityId> {
        self.meta.storage_id()
    }

    pub fn proxied_exercise_id(&self) -> EntityId {
        self.proxied_exercise_id
    }

    pub fn proxied_revision(&self) -> RevisionNumber {
        self.proxied_revision
    }

    pub fn frozen_title(&self) -> Option<&str> {
        self.frozen_title.as_deref()
    }

    pub fn set_frozen_title(&mut self, title: impl Into<String>) {
        self.frozen_title = Some(title.into());
    }

    pub fn touch(&mut self) {
        self.meta.touch();
    }
}

impl ExerciseContent for FrozenExercise {
    fn name(&self) -> &str {
        self.content.name()
    }

    fn public_description(&self) -> Option<&str> {
        self.content.public_description()
    }

    fn internal_notes(&self) -> Option<&str> {
        self.content.internal_notes()
    }

    fn language(&self) -> Option<&str> {
        self.content.language()
    }

    fn difficulty(&self) -> u32 {
        self.content.difficulty()
    }

    fn is_valid(&self) -> bool {
        self.content.is_valid()
    }

    fn tags(&self) -> &[Arc<Tag>] {
        self.content.tags()
    }

    fn stages(&self) -> &[Stage] {
        self.content.stages()
    }

    fn start_stage(&self) -> Option<StageId> {
        self.content.start_stage()
    }

    fn exercise_resources(&self) -> &[ExerciseResource] {
        self.content.exercise_resources()
    }

    fn variable_declarations(&self) -> &[VariableDeclaration] {
        self.content.variable_declarations()
    }

    fn result_feedback_mappings(&self) -> &[ResultFeedbackMapping] {
        self.content.result_feedback_mappings()
    }

    fn hint_malus(&self) -> Option<HintMalus> {
        self.content.hint_malus()
    }

    fn is_frozen(&self) -> bool {
        true
    }
}
