use crate::copy::{CopyResult, DeepCopy};
use serde::{Deserialize, Serialize};

/// Evaluator backend a piece of code is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluatorDomain {
    Math,
    Chem,
}

/// A snippet of evaluator code, owned by the surrounding content object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorExpression {
    pub domain: EvaluatorDomain,
    pub code: String,
}

impl EvaluatorExpression {
    pub fn math(code: impl Into<String>) -> Self {
        Self {
            domain: EvaluatorDomain::Math,
            code: code.into(),
        }
    }

    pub fn chem(code: impl Into<String>) -> Self {
        Self {
            domain: EvaluatorDomain::Chem,
            code: code.into(),
        }
    }
}

impl DeepCopy for EvaluatorExpression {
    fn deep_copy(&self) -> CopyResult<Self> {
        Ok(Self {
            domain: self.domain,
            code: self.code.clone(),
        })
    }
}

/// Maps an evaluator result onto feedback shown to the student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFeedbackMapping {
    pub expression: EvaluatorExpression,
    pub title: String,
    pub feedback_text: String,
}

impl ResultFeedbackMapping {
    pub fn new(
        expression: EvaluatorExpression,
        title: impl Into<String>,
        feedback_text: impl Into<String>,
    ) -> Self {
        Self {
            expression,
            title: title.into(),
            feedback_text: feedback_text.into(),
        }
    }
}

impl DeepCopy for ResultFeedbackMapping {
    fn deep_copy(&self) -> CopyResult<Self> {
        Ok(Self {
            expression: self.expression.deep_copy()?,
            title: self.title.clone(),
            feedback_text: self.feedback_text.clone(),
        })
    }
}
