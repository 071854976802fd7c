// ============================================================================
// Exercise Stages
// ============================================================================

use crate::content::expression::EvaluatorExpression;
use crate::content::variable::VariableUpdate;
use crate::copy::{CopyResult, DeepCopy, deep_copy_opt};
use crate::core::id::StageId;
use serde::{Deserialize, Serialize};

/// A transition out of a stage, optionally guarded by an evaluator
/// condition. `target: None` ends the exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTransition {
    pub condition: Option<EvaluatorExpression>,
    pub target: Option<StageId>,
}

impl StageTransition {
    pub fn to(target: StageId) -> Self {
        Self {
            condition: None,
            target: Some(target),
        }
    }

    pub fn guarded(condition: EvaluatorExpression, target: StageId) -> Self {
        Self {
            condition: Some(condition),
            target: Some(target),
        }
    }

    pub fn terminal() -> Self {
        Self {
            condition: None,
            target: None,
        }
    }
}

impl DeepCopy for StageTransition {
    fn deep_copy(&self) -> CopyResult<Self> {
        Ok(Self {
            condition: deep_copy_opt(&self.condition)?,
            target: self.target,
        })
    }
}

/// One step of an exercise.
///
/// Stages address each other through ids that are local to the owning
/// exercise, so the transition graph survives deep copies unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    local_id: StageId,
    name: String,
    weight: u32,
    skip_available: bool,
    default_transition: StageTransition,
    skip_transitions: Vec<StageTransition>,
    stage_transitions: Vec<StageTransition>,
    variable_updates: Vec<VariableUpdate>,
}

impl Stage {
    pub(crate) fn new(local_id: StageId, name: impl Into<String>) -> Self {
        Self {
            local_id,
            name: name.into(),
            weight: 1,
            skip_available: false,
            default_transition: StageTransition::terminal(),
            skip_transitions: Vec::new(),
            stage_transitions: Vec::new(),
            variable_updates: Vec::new(),
        }
    }

    pub fn local_id(&self) -> StageId {
        self.local_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: u32) {
        self.weight = weight;
    }

    pub fn skip_available(&self) -> bool {
        self.skip_available
    }

    pub fn set_skip_available(&mut self, skip_available: bool) {
        self.skip_available = skip_available;
    }

    pub fn default_transition(&self) -> &StageTransition {
        &self.default_transition
    }

    pub fn set_default_transition(&mut self, transition: StageTransition) {
        self.default_transition = transition;
    }

    pub fn skip_transitions(&self) -> &[StageTransition] {
        &self.skip_transitions
    }

    pub fn add_skip_transition(&mut self, transition: StageTransition) {
        self.skip_transitions.push(transition);
    }

    pub fn stage_transitions(&self) -> &[StageTransition] {
        &self.stage_transitions
    }

    pub fn add_stage_transition(&mut self, transition: StageTransition) {
        self.stage_transitions.push(transition);
    }

    pub fn variable_updates(&self) -> &[VariableUpdate] {
        &self.variable_updates
    }

    pub fn add_variable_update(&mut self, update: VariableUpdate) {
        self.variable_updates.push(update);
    }
}

impl DeepCopy for Stage {
    fn deep_copy(&self) -> CopyResult<Self> {
        Ok(Self {
            // local ids are aggregate-scoped, the copy keeps its wiring
            local_id: self.local_id,
            name: self.name.clone(),
            weight: self.weight,
            skip_available: self.skip_available,
            default_transition: self.default_transition.deep_copy()?,
            skip_transitions: self
                .skip_transitions
                .iter()
                .map(DeepCopy::deep_copy)
                .collect::<CopyResult<_>>()?,
            stage_transitions: self
                .stage_transitions
                .iter()
                .map(DeepCopy::deep_copy)
                .collect::<CopyResult<_>>()?,
            variable_updates: self
                .variable_updates
                .iter()
                .map(DeepCopy::deep_copy)
                .collect::<CopyResult<_>>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_preserves_transition_wiring() {
        let mut stage = Stage::new(StageId(1), "multiple choice");
        stage.set_default_transition(StageTransition::to(StageId(2)));
        stage.add_skip_transition(StageTransition::guarded(
            EvaluatorExpression::math("score == 0"),
            StageId(3),
        ));

        let copy = stage.deep_copy().unwrap();
        assert_eq!(copy.local_id(), StageId(1));
        assert_eq!(copy.default_transition().target, Some(StageId(2)));
        assert_eq!(copy.skip_transitions()[0].target, Some(StageId(3)));
        assert_eq!(copy, stage);
    }
}
