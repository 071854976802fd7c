use crate::content::expression::EvaluatorExpression;
use crate::copy::{CopyResult, DeepCopy, deep_copy_opt};
use serde::{Deserialize, Serialize};

/// Declaration of an exercise variable with optional initialization code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub name: String,
    pub initialization_code: Option<EvaluatorExpression>,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initialization_code: None,
        }
    }

    pub fn with_initialization(name: impl Into<String>, code: EvaluatorExpression) -> Self {
        Self {
            name: name.into(),
            initialization_code: Some(code),
        }
    }
}

impl DeepCopy for VariableDeclaration {
    fn deep_copy(&self) -> CopyResult<Self> {
        Ok(Self {
            name: self.name.clone(),
            initialization_code: deep_copy_opt(&self.initialization_code)?,
        })
    }
}

/// Reassignment of a declared variable, executed when a stage is processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableUpdate {
    pub variable_name: String,
    pub update_code: Option<EvaluatorExpression>,
}

impl VariableUpdate {
    pub fn new(variable_name: impl Into<String>, update_code: EvaluatorExpression) -> Self {
        Self {
            variable_name: variable_name.into(),
            update_code: Some(update_code),
        }
    }
}

impl DeepCopy for VariableUpdate {
    fn deep_copy(&self) -> CopyResult<Self> {
        Ok(Self {
            variable_name: self.variable_name.clone(),
            update_code: deep_copy_opt(&self.update_code)?,
        })
    }
}
