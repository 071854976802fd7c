pub mod catalog;
pub mod course;
pub mod exercise;
pub mod expression;
pub mod frozen;
pub mod provider;
pub mod resource;
pub mod stage;
pub mod usage;
pub mod variable;
pub mod version;

pub use catalog::{ContentFolder, Subject, Tag, User};
pub use course::{Course, ExerciseOrder, ScoringMode};
pub use exercise::{Exercise, HintMalus};
pub use expression::{EvaluatorDomain, EvaluatorExpression, ResultFeedbackMapping};
pub use frozen::{FrozenCourse, FrozenExercise};
pub use provider::{CourseEntry, ExerciseProvider, ProviderKind};
pub use resource::{CourseResource, ExerciseResource};
pub use stage::{Stage, StageTransition};
pub use usage::{CourseRecord, CourseRef, ExerciseRef, Submission};
pub use version::{
    CourseContent, CourseVersion, ExerciseContent, ExerciseVersion, HistoricalCourse,
    HistoricalExercise,
};
