// ============================================================================
// Usage Contexts
// ============================================================================
//
// A usage context is anything that must keep seeing the same content state
// once assigned: an in-progress attempt, a graded submission, a published
// offering. It references either a live aggregate (meaning "whatever the
// current state is") or a frozen snapshot (meaning "exactly this state,
// forever"). Resolution goes through the store transaction.
//
// ============================================================================

use crate::core::id::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference held by a usage context onto course content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseRef {
    /// The live course; follows every future edit.
    Live(EntityId),
    /// A frozen snapshot; never changes.
    Frozen(EntityId),
}

impl CourseRef {
    pub fn is_frozen(&self) -> bool {
        matches!(self, CourseRef::Frozen(_))
    }
}

/// Reference held by a usage context onto exercise content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseRef {
    Live(EntityId),
    Frozen(EntityId),
}

impl ExerciseRef {
    pub fn is_frozen(&self) -> bool {
        matches!(self, ExerciseRef::Frozen(_))
    }
}

/// A student's participation in a course offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    course: CourseRef,
    started_at: DateTime<Utc>,
}

impl CourseRecord {
    pub fn new(course: CourseRef) -> Self {
        Self {
            course,
            started_at: Utc::now(),
        }
    }

    pub fn course_ref(&self) -> CourseRef {
        self.course
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// A submission to one exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    exercise: ExerciseRef,
    submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(exercise: ExerciseRef) -> Self {
        Self {
            exercise,
            submitted_at: Utc::now(),
        }
    }

    pub fn exercise_ref(&self) -> ExerciseRef {
        self.exercise
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}
