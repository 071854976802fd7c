// ============================================================================
// Exercise Aggregate
// ============================================================================

use crate::content::catalog::Tag;
use crate::content::expression::ResultFeedbackMapping;
use crate::content::resource::ExerciseResource;
use crate::content::stage::Stage;
use crate::content::variable::VariableDeclaration;
use crate::content::version::ExerciseContent;
use crate::copy::{CopyResult, DeepCopy};
use crate::core::id::{EntityId, EntityRef, StageId};
use crate::core::meta::EntityMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// How taking a hint reduces the achievable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintMalus {
    CutActual,
    CutMaximum,
}

/// The mutable, author-owned exercise aggregate.
///
/// Stages, resources, variable declarations and feedback mappings are
/// owned; tags are shared catalog references. The suffix weights are a
/// derived cache: they are recomputed from the stage graph and are not part
/// of a deep copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    meta: EntityMeta,
    name: String,
    public_description: Option<String>,
    internal_notes: Option<String>,
    language: Option<String>,
    difficulty: u32,
    valid: bool,
    tags: Vec<Arc<Tag>>,
    resources: Vec<ExerciseResource>,
    stages: Vec<Stage>,
    next_stage_id: u32,
    start_stage: Option<StageId>,
    variable_declarations: Vec<VariableDeclaration>,
    result_feedback_mappings: Vec<ResultFeedbackMapping>,
    suffix_weights: BTreeMap<StageId, u32>,
    hint_malus: Option<HintMalus>,
}

impl Exercise {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
            public_description: None,
            internal_notes: None,
            language: None,
            difficulty: 0,
            valid: false,
            tags: Vec::new(),
            resources: Vec::new(),
            stages: Vec::new(),
            next_stage_id: 1,
            start_stage: None,
            variable_declarations: Vec::new(),
            result_feedback_mappings: Vec::new(),
            suffix_weights: BTreeMap::new(),
            hint_malus: None,
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
        self.id().map(EntityRef::exercise)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_public_description(&mut self, description: Option<String>) {
        self.public_description = description;
    }

    pub fn set_internal_notes(&mut self, notes: Option<String>) {
        self.internal_notes = notes;
    }

    pub fn set_language(&mut self, language: Option<String>) {
        self.language = language;
    }

    pub fn set_difficulty(&mut self, difficulty: u32) {
        self.difficulty = difficulty;
    }

    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    pub fn set_hint_malus(&mut self, hint_malus: Option<HintMalus>) {
        self.hint_malus = hint_malus;
    }

    pub fn add_tag(&mut self, tag: Arc<Tag>) {
        self.tags.push(tag);
    }

    pub fn remove_tag(&mut self, name: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t.name() != name);
        self.tags.len() != before
    }

    /// Adds a new stage and returns its aggregate-local id. The first stage
    /// added becomes the start stage.
    pub fn add_stage(&mut self, name: impl Into<String>) -> StageId {
        let id = StageId(self.next_stage_id);
        self.next_stage_id += 1;
        self.stages.push(Stage::new(id, name));
        if self.start_stage.is_none() {
            self.start_stage = Some(id);
        }
        id
    }

    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| s.local_id() == id)
    }

    pub fn stage_mut(&mut self, id: StageId) -> Option<&mut Stage> {
        self.stages.iter_mut().find(|s| s.local_id() == id)
    }

    pub fn remove_stage(&mut self, id: StageId) -> bool {
        let before = self.stages.len();
        self.stages.retain(|s| s.local_id() != id);
        if self.start_stage == Some(id) {
            self.start_stage = self.stages.first().map(Stage::local_id);
        }
        self.stages.len() != before
    }

    pub fn set_start_stage(&mut self, id: StageId) -> bool {
        if self.stage(id).is_some() {
            self.start_stage = Some(id);
            true
        } else {
            false
        }
    }

    pub fn add_exercise_resource(&mut self, resource: ExerciseResource) {
        self.resources.push(resource);
    }

    pub fn remove_exercise_resource(&mut self, filename: &str) -> bool {
        let before = self.resources.len();
        self.resources.retain(|r| r.filename() != filename);
        self.resources.len() != before
    }

    pub(crate) fn resources_mut(&mut self) -> &mut Vec<ExerciseResource> {
        &mut self.resources
    }

    pub fn add_variable(&mut self, declaration: VariableDeclaration) {
        self.variable_declarations.push(declaration);
    }

    pub fn remove_variable(&mut self, name: &str) -> bool {
        let before = self.variable_declarations.len();
        self.variable_declarations.retain(|v| v.name != name);
        self.variable_declarations.len() != before
    }

    pub fn add_result_feedback_mapping(&mut self, mapping: ResultFeedbackMapping) {
        self.result_feedback_mappings.push(mapping);
    }

    /// Recomputes the per-stage weight cache from the stage graph. Must be
    /// run again after a copy, a reset or any stage change; copies start
    /// with an empty cache.
    pub fn generate_suffix_weights(&mut self) {
        self.suffix_weights = self
            .stages
            .iter()
            .map(|s| (s.local_id(), s.weight()))
            .collect();
    }

    pub fn suffix_weights(&self) -> &BTreeMap<StageId, u32> {
        &self.suffix_weights
    }
}

impl ExerciseContent for Exercise {
    fn name(&self) -> &str {
        &self.name
    }

    fn public_description(&self) -> Option<&str> {
        self.public_description.as_deref()
    }

    fn internal_notes(&self) -> Option<&str> {
        self.internal_notes.as_deref()
    }

    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn difficulty(&self) -> u32 {
        self.difficulty
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn tags(&self) -> &[Arc<Tag>] {
        &self.tags
    }

    fn stages(&self) -> &[Stage] {
        &self.stages
    }

    fn start_stage(&self) -> Option<StageId> {
        self.start_stage
    }

    fn exercise_resources(&self) -> &[ExerciseResource] {
        &self.resources
    }

    fn variable_declarations(&self) -> &[VariableDeclaration] {
        &self.variable_declarations
    }

    fn result_feedback_mappings(&self) -> &[ResultFeedbackMapping] {
        &self.result_feedback_mappings
    }

    fn hint_malus(&self) -> Option<HintMalus> {
        self.hint_malus
    }

    fn is_frozen(&self) -> bool {
        false
    }
}

impl DeepCopy for Exercise {
    fn deep_copy(&self) -> CopyResult<Self> {
        Ok(Self {
            meta: self.meta.copied(),
            name: self.name.clone(),
            public_description: self.public_description.clone(),
            internal_notes: self.internal_notes.clone(),
            language: self.language.clone(),
            difficulty: self.difficulty,
            valid: self.valid,
            // tags are catalog data, shared by reference
            tags: self.tags.clone(),
            resources: self
                .resources
                .iter()
                .map(DeepCopy::deep_copy)
                .collect::<CopyResult<_>>()?,
            stages: self
                .stages
                .iter()
                .map(DeepCopy::deep_copy)
                .collect::<CopyResult<_>>()?,
            next_stage_id: self.next_stage_id,
            start_stage: self.start_stage,
            variable_declarations: self
                .variable_declarations
                .iter()
                .map(DeepCopy::deep_copy)
                .collect::<CopyResult<_>>()?,
            result_feedback_mappings: self
                .result_feedback_mappings
                .iter()
                .map(DeepCopy::deep_copy)
                .collect::<CopyResult<_>>()?,
            // derived cache, regenerated on demand
            suffix_weights: BTreeMap::new(),
            hint_malus: self.hint_malus,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_stage_becomes_start_stage() {
        let mut exercise = Exercise::new("Integration by parts");
        let first = exercise.add_stage("intro");
        let second = exercise.add_stage("calculation");
        assert_eq!(exercise.start_stage(), Some(first));
        assert!(exercise.set_start_stage(second));
    }

    #[test]
    fn test_removing_start_stage_falls_back() {
        let mut exercise = Exercise::new("Integration by parts");
        let first = exercise.add_stage("intro");
        let second = exercise.add_stage("calculation");
        assert!(exercise.remove_stage(first));
        assert_eq!(exercise.start_stage(), Some(second));
    }

    #[test]
    fn test_suffix_weights_are_regenerated_not_copied() {
        let mut exercise = Exercise::new("Integration by parts");
        let id = exercise.add_stage("intro");
        exercise.stage_mut(id).unwrap().set_weight(3);
        exercise.generate_suffix_weights();
        assert_eq!(exercise.suffix_weights().get(&id), Some(&3));

        let copy = exercise.deep_copy().unwrap();
        assert!(copy.suffix_weights().is_empty());
    }
}
