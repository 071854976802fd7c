// ============================================================================
// Course Aggregate
// ============================================================================

use crate::content::catalog::{ContentFolder, Subject};
use crate::content::expression::ResultFeedbackMapping;
use crate::content::provider::ExerciseProvider;
use crate::content::resource::CourseResource;
use crate::content::version::CourseContent;
use crate::copy::{CopyResult, DeepCopy, deep_copy_opt};
use crate::core::id::{EntityId, EntityRef};
use crate::core::meta::EntityMeta;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How the results of multiple submissions to the same exercise are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoringMode {
    #[default]
    Best,
    Last,
}

/// The order exercises are presented in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExerciseOrder {
    #[default]
    Manual,
    Alphabetic,
    Difficulty,
}

/// The mutable, author-owned course aggregate.
///
/// A course owns its provider, resources and feedback mappings; folder and
/// subject are shared catalog references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    meta: EntityMeta,
    name: String,
    external_description: Option<String>,
    internal_description: Option<String>,
    language: Option<String>,
    valid: bool,
    scoring_mode: ScoringMode,
    exercise_order: ExerciseOrder,
    content_provider: Option<ExerciseProvider>,
    course_resources: Vec<CourseResource>,
    result_feedback_mappings: Vec<ResultFeedbackMapping>,
    folder: Option<Arc<ContentFolder>>,
    subject: Option<Arc<Subject>>,
}

impl PartialEq<Course> for &Course {
    fn eq(&self, other: &Course) -> bool {
        (**self).eq(other)
    }
}

impl Course {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
            external_description: None,
            internal_description: None,
            language: None,
            valid: false,
            scoring_mode: ScoringMode::default(),
            exercise_order: ExerciseOrder::default(),
            content_provider: None,
            course_resources: Vec::new(),
            result_feedback_mappings: Vec::new(),
            folder: None,
            subject: None,
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

    pub fn is_transient(&self) -> bool {
        self.meta.is_transient()
    }

    pub fn entity_ref(&self) -> Option<EntityRef> {
        self.id().map(EntityRef::course)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_external_description(&mut self, description: Option<String>) {
        self.external_description = description;
    }

    pub fn set_internal_description(&mut self, description: Option<String>) {
        self.internal_description = description;
    }

    pub fn set_language(&mut self, language: Option<String>) {
        self.language = language;
    }

    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    pub fn set_scoring_mode(&mut self, scoring_mode: ScoringMode) {
        self.scoring_mode = scoring_mode;
    }

    pub fn set_exercise_order(&mut self, exercise_order: ExerciseOrder) {
        self.exercise_order = exercise_order;
    }

    pub fn set_content_provider(&mut self, provider: Option<ExerciseProvider>) {
        self.content_provider = provider;
    }

    pub(crate) fn content_provider_mut(&mut self) -> Option<&mut ExerciseProvider> {
        self.content_provider.as_mut()
    }

    pub(crate) fn take_content_provider(&mut self) -> Option<ExerciseProvider> {
        self.content_provider.take()
    }

    pub fn add_course_resource(&mut self, resource: CourseResource) {
        self.course_resources.push(resource);
    }

    /// Removes the resource with the given filename. Returns whether one
    /// was removed.
    pub fn remove_course_resource(&mut self, filename: &str) -> bool {
        let before = self.course_resources.len();
        self.course_resources.retain(|r| r.filename() != filename);
        self.course_resources.len() != before
    }

    pub(crate) fn course_resources_mut(&mut self) -> &mut Vec<CourseResource> {
        &mut self.course_resources
    }

    pub fn add_result_feedback_mapping(&mut self, mapping: ResultFeedbackMapping) {
        self.result_feedback_mappings.push(mapping);
    }

    pub fn set_folder(&mut self, folder: Option<Arc<ContentFolder>>) {
        self.folder = folder;
    }

    pub fn set_subject(&mut self, subject: Option<Arc<Subject>>) {
        self.subject = subject;
    }
}

impl CourseContent for Course {
    fn name(&self) -> &str {
        &self.name
    }

    fn external_description(&self) -> Option<&str> {
        self.external_description.as_deref()
    }

    fn internal_description(&self) -> Option<&str> {
        self.internal_description.as_deref()
    }

    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn scoring_mode(&self) -> ScoringMode {
        self.scoring_mode
    }

    fn exercise_order(&self) -> ExerciseOrder {
        self.exercise_order
    }

    fn content_provider(&self) -> Option<&ExerciseProvider> {
        self.content_provider.as_ref()
    }

    fn course_resources(&self) -> &[CourseResource] {
        &self.course_resources
    }

    fn result_feedback_mappings(&self) -> &[ResultFeedbackMapping] {
        &self.result_feedback_mappings
    }

    fn folder(&self) -> Option<&Arc<ContentFolder>> {
        self.folder.as_ref()
    }

    fn subject(&self) -> Option<&Arc<Subject>> {
        self.subject.as_ref()
    }

    fn is_frozen(&self) -> bool {
        false
    }
}

impl DeepCopy for Course {
    fn deep_copy(&self) -> CopyResult<Self> {
        Ok(Self {
            meta: self.meta.copied(),
            name: self.name.clone(),
            external_description: self.external_description.clone(),
            internal_description: self.internal_description.clone(),
            language: self.language.clone(),
            valid: self.valid,
            scoring_mode: self.scoring_mode,
            exercise_order: self.exercise_order,
            content_provider: deep_copy_opt(&self.content_provider)?,
            course_resources: self
                .course_resources
                .iter()
                .map(DeepCopy::deep_copy)
                .collect::<CopyResult<_>>()?,
            result_feedback_mappings: self
                .result_feedback_mappings
                .iter()
                .map(DeepCopy::deep_copy)
                .collect::<CopyResult<_>>()?,
            // folder and subject are catalog data, shared by reference
            folder: self.folder.clone(),
            subject: self.subject.clone(),
        })
    }
}
