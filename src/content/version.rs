// ============================================================================
// Provenance Unions
// ============================================================================
//
// Every course or exercise instance flowing through the system is in
// exactly one of three provenance states:
//
//   Live        - the mutable authoring head
//   Frozen      - an independent snapshot pinned to one revision
//   Historical  - a materialized past revision of a still-live aggregate,
//                 read-only and without persisted identity of its own
//
// The unions below make those states a closed set. Only the Live variant
// offers mutation; calling a mutator on the other variants fails with
// ImmutableState instead of silently corrupting audited data.
//
// ============================================================================

use crate::content::catalog::{ContentFolder, Subject, Tag};
use crate::content::course::{Course, ExerciseOrder, ScoringMode};
use crate::content::exercise::{Exercise, HintMalus};
use crate::content::expression::ResultFeedbackMapping;
use crate::content::frozen::{FrozenCourse, FrozenExercise};
use crate::content::provider::ExerciseProvider;
use crate::content::resource::{CourseResource, ExerciseResource};
use crate::content::stage::Stage;
use crate::content::variable::VariableDeclaration;
use crate::core::error::{Result, RevisionError};
use crate::core::id::{EntityId, RevisionNumber, StageId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MUST_NOT_CHANGE_FROZEN: &str = "must not change state of frozen objects";
const MUST_NOT_CHANGE_HISTORICAL: &str = "must not change state of historical views";

/// Read surface shared by live courses, frozen courses and historical
/// views, so rendering, grading and export can treat them uniformly.
pub trait CourseContent {
    fn name(&self) -> &str;
    fn external_description(&self) -> Option<&str>;
    fn internal_description(&self) -> Option<&str>;
    fn language(&self) -> Option<&str>;
    fn is_valid(&self) -> bool;
    fn scoring_mode(&self) -> ScoringMode;
    fn exercise_order(&self) -> ExerciseOrder;
    fn content_provider(&self) -> Option<&ExerciseProvider>;
    fn course_resources(&self) -> &[CourseResource];
    fn result_feedback_mappings(&self) -> &[ResultFeedbackMapping];
    fn folder(&self) -> Option<&Arc<ContentFolder>>;
    fn subject(&self) -> Option<&Arc<Subject>>;
    fn is_frozen(&self) -> bool;
}

/// Read surface shared by live exercises, frozen exercises and historical
/// views.
pub trait ExerciseContent {
    fn name(&self) -> &str;
    fn public_description(&self) -> Option<&str>;
    fn internal_notes(&self) -> Option<&str>;
    fn language(&self) -> Option<&str>;
    fn difficulty(&self) -> u32;
    fn is_valid(&self) -> bool;
    fn tags(&self) -> &[Arc<Tag>];
    fn stages(&self) -> &[Stage];
    fn start_stage(&self) -> Option<StageId>;
    fn exercise_resources(&self) -> &[ExerciseResource];
    fn variable_declarations(&self) -> &[VariableDeclaration];
    fn result_feedback_mappings(&self) -> &[ResultFeedbackMapping];
    fn hint_malus(&self) -> Option<HintMalus>;
    fn is_frozen(&self) -> bool;
}

/// A materialized past revision of a still-live course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalCourse {
    revision: RevisionNumber,
    content: Course,
}

impl HistoricalCourse {
    pub(crate) fn new(revision: RevisionNumber, content: Course) -> Self {
        Self { revision, content }
    }

    /// The revision this view was materialized from. Callers always know
    /// this; asking the log for "the latest revision" of a historical view
    /// is rejected instead.
    pub fn revision(&self) -> RevisionNumber {
        self.revision
    }

    pub fn entity_id(&self) -> Option<EntityId> {
        self.content.id()
    }

    pub fn content(&self) -> &Course {
        &self.content
    }

    pub(crate) fn into_content(self) -> Course {
        self.content
    }
}

/// A materialized past revision of a still-live exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalExercise {
    revision: RevisionNumber,
    content: Exercise,
}

impl HistoricalExercise {
    pub(crate) fn new(revision: RevisionNumber, content: Exercise) -> Self {
        Self { revision, content }
    }

    pub fn revision(&self) -> RevisionNumber {
        self.revision
    }

    pub fn entity_id(&self) -> Option<EntityId> {
        self.content.id()
    }

    pub fn content(&self) -> &Exercise {
        &self.content
    }

    pub(crate) fn into_content(self) -> Exercise {
        self.content
    }
}

/// A course in one of its three provenance states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CourseVersion {
    Live(Course),
    Frozen(FrozenCourse),
    Historical(HistoricalCourse),
}

impl CourseVersion {
    pub fn is_frozen(&self) -> bool {
        matches!(self, CourseVersion::Frozen(_))
    }

    pub fn is_from_history(&self) -> bool {
        matches!(self, CourseVersion::Historical(_))
    }

    pub fn is_transient(&self) -> bool {
        match self {
            CourseVersion::Live(c) => c.is_transient(),
            CourseVersion::Frozen(f) => f.meta().is_transient(),
            CourseVersion::Historical(_) => false,
        }
    }

    pub fn as_live(&self) -> Option<&Course> {
        match self {
            CourseVersion::Live(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_frozen(&self) -> Option<&FrozenCourse> {
        match self {
            CourseVersion::Frozen(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_historical(&self) -> Option<&HistoricalCourse> {
        match self {
            CourseVersion::Historical(h) => Some(h),
            _ => None,
        }
    }

    fn live_mut(&mut self) -> Result<&mut Course> {
        match self {
            CourseVersion::Live(c) => Ok(c),
            CourseVersion::Frozen(_) => Err(RevisionError::ImmutableState(MUST_NOT_CHANGE_FROZEN)),
            CourseVersion::Historical(_) => {
                Err(RevisionError::ImmutableState(MUST_NOT_CHANGE_HISTORICAL))
            }
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.live_mut()?.set_name(name);
        Ok(())
    }

    pub fn set_language(&mut self, language: Option<String>) -> Result<()> {
        self.live_mut()?.set_language(language);
        Ok(())
    }

    pub fn set_valid(&mut self, valid: bool) -> Result<()> {
        self.live_mut()?.set_valid(valid);
        Ok(())
    }

    pub fn set_scoring_mode(&mut self, scoring_mode: ScoringMode) -> Result<()> {
        self.live_mut()?.set_scoring_mode(scoring_mode);
        Ok(())
    }

    pub fn set_exercise_order(&mut self, exercise_order: ExerciseOrder) -> Result<()> {
        self.live_mut()?.set_exercise_order(exercise_order);
        Ok(())
    }

    pub fn set_external_description(&mut self, description: Option<String>) -> Result<()> {
        self.live_mut()?.set_external_description(description);
        Ok(())
    }

    pub fn set_internal_description(&mut self, description: Option<String>) -> Result<()> {
        self.live_mut()?.set_internal_description(description);
        Ok(())
    }

    pub fn set_content_provider(&mut self, provider: Option<ExerciseProvider>) -> Result<()> {
        self.live_mut()?.set_content_provider(provider);
        Ok(())
    }

    pub fn add_course_resource(&mut self, resource: CourseResource) -> Result<()> {
        self.live_mut()?.add_course_resource(resource);
        Ok(())
    }

    pub fn remove_course_resource(&mut self, filename: &str) -> Result<bool> {
        Ok(self.live_mut()?.remove_course_resource(filename))
    }

    pub fn add_result_feedback_mapping(&mut self, mapping: ResultFeedbackMapping) -> Result<()> {
        self.live_mut()?.add_result_feedback_mapping(mapping);
        Ok(())
    }
}

impl CourseContent for CourseVersion {
    fn name(&self) -> &str {
        match self {
            CourseVersion::Live(c) => c.name(),
            CourseVersion::Frozen(f) => f.name(),
            CourseVersion::Historical(h) => h.content().name(),
        }
    }

    fn external_description(&self) -> Option<&str> {
        match self {
            CourseVersion::Live(c) => c.external_description(),
            CourseVersion::Frozen(f) => f.external_description(),
            CourseVersion::Historical(h) => h.content().external_description(),
        }
    }

    fn internal_description(&self) -> Option<&str> {
        match self {
            CourseVersion::Live(c) => c.internal_description(),
            CourseVersion::Frozen(f) => f.internal_description(),
            CourseVersion::Historical(h) => h.content().internal_description(),
        }
    }

    fn language(&self) -> Option<&str> {
        match self {
            CourseVersion::Live(c) => c.language(),
            CourseVersion::Frozen(f) => f.language(),
            CourseVersion::Historical(h) => h.content().language(),
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            CourseVersion::Live(c) => c.is_valid(),
            CourseVersion::Frozen(f) => f.is_valid(),
            CourseVersion::Historical(h) => h.content().is_valid(),
        }
    }

    fn scoring_mode(&self) -> ScoringMode {
        match self {
            CourseVersion::Live(c) => c.scoring_mode(),
            CourseVersion::Frozen(f) => f.scoring_mode(),
            CourseVersion::Historical(h) => h.content().scoring_mode(),
        }
    }

    fn exercise_order(&self) -> ExerciseOrder {
        match self {
            CourseVersion::Live(c) => c.exercise_order(),
            CourseVersion::Frozen(f) => f.exercise_order(),
            CourseVersion::Historical(h) => h.content().exercise_order(),
        }
    }

    fn content_provider(&self) -> Option<&ExerciseProvider> {
        match self {
            CourseVersion::Live(c) => c.content_provider(),
            CourseVersion::Frozen(f) => f.content_provider(),
            CourseVersion::Historical(h) => h.content().content_provider(),
        }
    }

    fn course_resources(&self) -> &[CourseResource] {
        match self {
            CourseVersion::Live(c) => c.course_resources(),
            CourseVersion::Frozen(f) => f.course_resources(),
            CourseVersion::Historical(h) => h.content().course_resources(),
        }
    }

    fn result_feedback_mappings(&self) -> &[ResultFeedbackMapping] {
        match self {
            CourseVersion::Live(c) => c.result_feedback_mappings(),
            CourseVersion::Frozen(f) => f.result_feedback_mappings(),
            CourseVersion::Historical(h) => h.content().result_feedback_mappings(),
        }
    }

    fn folder(&self) -> Option<&Arc<ContentFolder>> {
        match self {
            CourseVersion::Live(c) => c.folder(),
            CourseVersion::Frozen(f) => f.folder(),
            CourseVersion::Historical(h) => h.content().folder(),
        }
    }

    fn subject(&self) -> Option<&Arc<Subject>> {
        match self {
            CourseVersion::Live(c) => c.subject(),
            CourseVersion::Frozen(f) => f.subject(),
            CourseVersion::Historical(h) => h.content().subject(),
        }
    }

    fn is_frozen(&self) -> bool {
        matches!(self, CourseVersion::Frozen(_))
    }
}

/// An exercise in one of its three provenance states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExerciseVersion {
    Live(Exercise),
    Frozen(FrozenExercise),
    Historical(HistoricalExercise),
}

impl ExerciseVersion {
    pub fn is_frozen(&self) -> bool {
        matches!(self, ExerciseVersion::Frozen(_))
    }

    pub fn is_from_history(&self) -> bool {
        matches!(self, ExerciseVersion::Historical(_))
    }

    pub fn is_transient(&self) -> bool {
        match self {
            ExerciseVersion::Live(e) => e.is_transient(),
            ExerciseVersion::Frozen(f) => f.meta().is_transient(),
            ExerciseVersion::Historical(_) => false,
        }
    }

    pub fn as_live(&self) -> Option<&Exercise> {
        match self {
            ExerciseVersion::Live(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_frozen(&self) -> Option<&FrozenExercise> {
        match self {
            ExerciseVersion::Frozen(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_historical(&self) -> Option<&HistoricalExercise> {
        match self {
            ExerciseVersion::Historical(h) => Some(h),
            _ => None,
        }
    }

    fn live_mut(&mut self) -> Result<&mut Exercise> {
        match self {
            ExerciseVersion::Live(e) => Ok(e),
            ExerciseVersion::Frozen(_) => {
                Err(RevisionError::ImmutableState(MUST_NOT_CHANGE_FROZEN))
            }
            ExerciseVersion::Historical(_) => {
                Err(RevisionError::ImmutableState(MUST_NOT_CHANGE_HISTORICAL))
            }
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.live_mut()?.set_name(name);
        Ok(())
    }

    pub fn set_difficulty(&mut self, difficulty: u32) -> Result<()> {
        self.live_mut()?.set_difficulty(difficulty);
        Ok(())
    }

    pub fn set_valid(&mut self, valid: bool) -> Result<()> {
        self.live_mut()?.set_valid(valid);
        Ok(())
    }

    pub fn set_language(&mut self, language: Option<String>) -> Result<()> {
        self.live_mut()?.set_language(language);
        Ok(())
    }

    pub fn add_tag(&mut self, tag: Arc<Tag>) -> Result<()> {
        self.live_mut()?.add_tag(tag);
        Ok(())
    }

    pub fn remove_tag(&mut self, name: &str) -> Result<bool> {
        Ok(self.live_mut()?.remove_tag(name))
    }

    pub fn add_stage(&mut self, name: impl Into<String>) -> Result<StageId> {
        Ok(self.live_mut()?.add_stage(name))
    }

    pub fn set_start_stage(&mut self, id: StageId) -> Result<bool> {
        Ok(self.live_mut()?.set_start_stage(id))
    }

    pub fn add_variable(&mut self, declaration: VariableDeclaration) -> Result<()> {
        self.live_mut()?.add_variable(declaration);
        Ok(())
    }

    pub fn add_exercise_resource(&mut self, resource: ExerciseResource) -> Result<()> {
        self.live_mut()?.add_exercise_resource(resource);
        Ok(())
    }

    pub fn remove_exercise_resource(&mut self, filename: &str) -> Result<bool> {
        Ok(self.live_mut()?.remove_exercise_resource(filename))
    }
}

impl ExerciseContent for ExerciseVersion {
    fn name(&self) -> &str {
        match self {
            ExerciseVersion::Live(e) => e.name(),
            ExerciseVersion::Frozen(f) => f.name(),
            ExerciseVersion::Historical(h) => h.content().name(),
        }
    }

    fn public_description(&self) -> Option<&str> {
        match self {
            ExerciseVersion::Live(e) => e.public_description(),
            ExerciseVersion::Frozen(f) => f.public_description(),
            ExerciseVersion::Historical(h) => h.content().public_description(),
        }
    }

    fn internal_notes(&self) -> Option<&str> {
        match self {
            ExerciseVersion::Live(e) => e.internal_notes(),
            ExerciseVersion::Frozen(f) => f.internal_notes(),
            ExerciseVersion::Historical(h) => h.content().internal_notes(),
        }
    }

    fn language(&self) -> Option<&str> {
        match self {
            ExerciseVersion::Live(e) => e.language(),
            ExerciseVersion::Frozen(f) => f.language(),
            ExerciseVersion::Historical(h) => h.content().language(),
        }
    }

    fn difficulty(&self) -> u32 {
        match self {
            ExerciseVersion::Live(e) => e.difficulty(),
            ExerciseVersion::Frozen(f) => f.difficulty(),
            ExerciseVersion::Historical(h) => h.content().difficulty(),
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            ExerciseVersion::Live(e) => e.is_valid(),
            ExerciseVersion::Frozen(f) => f.is_valid(),
            ExerciseVersion::Historical(h) => h.content().is_valid(),
        }
    }

    fn tags(&self) -> &[Arc<Tag>] {
        match self {
            ExerciseVersion::Live(e) => e.tags(),
            ExerciseVersion::Frozen(f) => f.tags(),
            ExerciseVersion::Historical(h) => h.content().tags(),
        }
    }

    fn stages(&self) -> &[Stage] {
        match self {
            ExerciseVersion::Live(e) => e.stages(),
            ExerciseVersion::Frozen(f) => f.stages(),
            ExerciseVersion::Historical(h) => h.content().stages(),
        }
    }

    fn start_stage(&self) -> Option<StageId> {
        match self {
            ExerciseVersion::Live(e) => e.start_stage(),
            ExerciseVersion::Frozen(f) => f.start_stage(),
            ExerciseVersion::Historical(h) => h.content().start_stage(),
        }
    }

    fn exercise_resources(&self) -> &[ExerciseResource] {
        match self {
            ExerciseVersion::Live(e) => e.exercise_resources(),
            ExerciseVersion::Frozen(f) => f.exercise_resources(),
            ExerciseVersion::Historical(h) => h.content().exercise_resources(),
        }
    }

    fn variable_declarations(&self) -> &[VariableDeclaration] {
        match self {
            ExerciseVersion::Live(e) => e.variable_declarations(),
            ExerciseVersion::Frozen(f) => f.variable_declarations(),
            ExerciseVersion::Historical(h) => h.content().variable_declarations(),
        }
    }

    fn result_feedback_mappings(&self) -> &[ResultFeedbackMapping] {
        match self {
            ExerciseVersion::Live(e) => e.result_feedback_mappings(),
            ExerciseVersion::Frozen(f) => f.result_feedback_mappings(),
            ExerciseVersion::Historical(h) => h.content().result_feedback_mappings(),
        }
    }

    fn hint_malus(&self) -> Option<HintMalus> {
        match self {
            ExerciseVersion::Live(e) => e.hint_malus(),
            ExerciseVersion::Frozen(f) => f.hint_malus(),
            ExerciseVersion::Historical(h) => h.content().hint_malus(),
        }
    }

    fn is_frozen(&self) -> bool {
        matches!(self, ExerciseVersion::Frozen(_))
    }
}
