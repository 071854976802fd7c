// ============================================================================
// Copy Contract Registry
// ============================================================================
//
// One entry per content type: a minimal sample with every copied field
// populated to a non-default value, plus a verifier that checks the copy
// contract field by field:
//
//   copied          - value-equal one level deep, not identity-equal
//   reference-only  - the very same allocation (Arc::ptr_eq)
//   excluded        - left at default in the copy
//
// The registry is enumerable, so the deep-copy test suite walks it instead
// of discovering fields through reflection.
//
// ============================================================================

use crate::content::catalog::{ContentFolder, Subject, Tag, User};
use crate::content::course::{Course, ExerciseOrder, ScoringMode};
use crate::content::exercise::Exercise;
use crate::content::expression::{EvaluatorExpression, ResultFeedbackMapping};
use crate::content::provider::{CourseEntry, ExerciseProvider, ProviderKind};
use crate::content::resource::{CourseResource, ExerciseResource};
use crate::content::stage::{Stage, StageTransition};
use crate::content::variable::{VariableDeclaration, VariableUpdate};
use crate::content::version::{CourseContent, ExerciseContent};
use crate::copy::DeepCopy;
use crate::core::id::{EntityId, StageId};
use lazy_static::lazy_static;
use std::sync::Arc;

/// A verifiable description of one type's copy behavior.
pub struct CopyContract {
    pub type_name: &'static str,
    pub verify: fn() -> Result<(), String>,
}

lazy_static! {
    static ref COPY_CONTRACTS: Vec<CopyContract> = vec![
        CopyContract {
            type_name: "EvaluatorExpression",
            verify: verify_evaluator_expression,
        },
        CopyContract {
            type_name: "ResultFeedbackMapping",
            verify: verify_result_feedback_mapping,
        },
        CopyContract {
            type_name: "VariableDeclaration",
            verify: verify_variable_declaration,
        },
        CopyContract {
            type_name: "VariableUpdate",
            verify: verify_variable_update,
        },
        CopyContract {
            type_name: "CourseResource",
            verify: verify_course_resource,
        },
        CopyContract {
            type_name: "ExerciseResource",
            verify: verify_exercise_resource,
        },
        CopyContract {
            type_name: "Stage",
            verify: verify_stage,
        },
        CopyContract {
            type_name: "ExerciseProvider",
            verify: verify_exercise_provider,
        },
        CopyContract {
            type_name: "Course",
            verify: verify_course,
        },
        CopyContract {
            type_name: "Exercise",
            verify: verify_exercise,
        },
    ];
}

/// All registered copy contracts.
pub fn contracts() -> &'static [CopyContract] {
    &COPY_CONTRACTS
}

fn check(field: &'static str, ok: bool) -> Result<(), String> {
    if ok {
        Ok(())
    } else {
        Err(format!("field `{field}` violates its copy contract"))
    }
}

fn distinct_str(a: &str, b: &str) -> bool {
    a.as_ptr() != b.as_ptr()
}

fn distinct_bytes(a: &[u8], b: &[u8]) -> bool {
    a.as_ptr() != b.as_ptr()
}

fn verify_evaluator_expression() -> Result<(), String> {
    let original = EvaluatorExpression::math("x^2 + 1");
    let copy = original.deep_copy().map_err(|e| e.to_string())?;

    check("domain", copy.domain == original.domain)?;
    check(
        "code",
        copy.code == original.code && distinct_str(&copy.code, &original.code),
    )
}

fn verify_result_feedback_mapping() -> Result<(), String> {
    let original = ResultFeedbackMapping::new(
        EvaluatorExpression::math("score < 0.5"),
        "partially correct",
        "Check the sign of the second term.",
    );
    let copy = original.deep_copy().map_err(|e| e.to_string())?;

    check("expression", copy.expression == original.expression)?;
    check(
        "title",
        copy.title == original.title && distinct_str(&copy.title, &original.title),
    )?;
    check(
        "feedback_text",
        copy.feedback_text == original.feedback_text
            && distinct_str(&copy.feedback_text, &original.feedback_text),
    )
}

fn verify_variable_declaration() -> Result<(), String> {
    let original =
        VariableDeclaration::with_initialization("a", EvaluatorExpression::math("randint(1, 10)"));
    let copy = original.deep_copy().map_err(|e| e.to_string())?;

    check(
        "name",
        copy.name == original.name && distinct_str(&copy.name, &original.name),
    )?;
    check(
        "initialization_code",
        copy.initialization_code == original.initialization_code,
    )
}

fn verify_variable_update() -> Result<(), String> {
    let original = VariableUpdate::new("a", EvaluatorExpression::math("a + 1"));
    let copy = original.deep_copy().map_err(|e| e.to_string())?;

    check(
        "variable_name",
        copy.variable_name == original.variable_name
            && distinct_str(&copy.variable_name, &original.variable_name),
    )?;
    check("update_code", copy.update_code == original.update_code)
}

fn sample_course_resource() -> CourseResource {
    let mut resource = CourseResource::new(
        "syllabus.pdf",
        vec![0x25, 0x50, 0x44, 0x46],
        Some(Arc::new(User::new("alice"))),
    );
    resource.set_description("course syllabus");
    resource.meta_mut().assign_storage_id(EntityId::new(91));
    resource.meta_mut().touch();
    resource
}

fn verify_course_resource() -> Result<(), String> {
    let original = sample_course_resource();
    let copy = original.deep_copy().map_err(|e| e.to_string())?;

    check(
        "filename",
        copy.filename() == original.filename()
            && distinct_str(copy.filename(), original.filename()),
    )?;
    check(
        "content",
        copy.content() == original.content()
            && distinct_bytes(copy.content(), original.content()),
    )?;
    check("description", copy.description() == original.description())?;
    // reference-only
    check(
        "last_editor",
        match (copy.last_editor(), original.last_editor()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        },
    )?;
    // excluded
    check("meta.storage_id", copy.meta().is_transient())?;
    check("meta.updated_at", copy.meta().updated_at().is_none())
}

fn verify_exercise_resource() -> Result<(), String> {
    let mut original = ExerciseResource::new(
        "dataset.csv",
        b"x,y\n1,2\n".to_vec(),
        Some(Arc::new(User::new("bob"))),
    );
    original.set_description("measurement data");
    original.meta_mut().assign_storage_id(EntityId::new(92));
    let copy = original.deep_copy().map_err(|e| e.to_string())?;

    check(
        "filename",
        copy.filename() == original.filename()
            && distinct_str(copy.filename(), original.filename()),
    )?;
    check(
        "content",
        copy.content() == original.content()
            && distinct_bytes(copy.content(), original.content()),
    )?;
    check(
        "last_editor",
        match (copy.last_editor(), original.last_editor()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        },
    )?;
    check("meta.storage_id", copy.meta().is_transient())
}

fn verify_stage() -> Result<(), String> {
    let mut original = Stage::new(StageId(1), "multiple choice");
    original.set_weight(4);
    original.set_skip_available(true);
    original.set_default_transition(StageTransition::to(StageId(2)));
    original.add_skip_transition(StageTransition::guarded(
        EvaluatorExpression::math("score == 0"),
        StageId(3),
    ));
    original.add_variable_update(VariableUpdate::new("a", EvaluatorExpression::math("a + 1")));
    let copy = original.deep_copy().map_err(|e| e.to_string())?;

    check("local_id", copy.local_id() == original.local_id())?;
    check(
        "name",
        copy.name() == original.name() && distinct_str(copy.name(), original.name()),
    )?;
    check("weight", copy.weight() == original.weight())?;
    check("skip_available", copy.skip_available() == original.skip_available())?;
    check(
        "default_transition",
        copy.default_transition() == original.default_transition(),
    )?;
    check(
        "skip_transitions",
        copy.skip_transitions() == original.skip_transitions()
            && copy.skip_transitions().as_ptr() != original.skip_transitions().as_ptr(),
    )?;
    check(
        "variable_updates",
        copy.variable_updates() == original.variable_updates()
            && copy.variable_updates().as_ptr() != original.variable_updates().as_ptr(),
    )
}

fn verify_exercise_provider() -> Result<(), String> {
    let mut original = ExerciseProvider::fixed_list(vec![CourseEntry::new(EntityId::new(4), 10, 0)]);
    original.meta_mut().assign_storage_id(EntityId::new(93));
    let copy = original.deep_copy().map_err(|e| e.to_string())?;

    check("entries", copy.entries() == original.entries())?;
    check("meta.storage_id", copy.meta().is_transient())?;

    // the folder variant shares its catalog references
    let folder = Arc::new(ContentFolder::new("algebra"));
    let folder_provider = ExerciseProvider::folder(vec![folder.clone()]);
    let folder_copy = folder_provider.deep_copy().map_err(|e| e.to_string())?;
    check(
        "folders",
        match folder_copy.kind() {
            ProviderKind::Folder { folders } => Arc::ptr_eq(&folders[0], &folder),
            _ => false,
        },
    )
}

fn sample_course() -> Course {
    let mut course = Course::new("Analysis I");
    course.set_external_description(Some("First semester analysis".into()));
    course.set_internal_description(Some("rework exercise pool".into()));
    course.set_language(Some("de".into()));
    course.set_valid(true);
    course.set_scoring_mode(ScoringMode::Last);
    course.set_exercise_order(ExerciseOrder::Alphabetic);
    course.set_content_provider(Some(ExerciseProvider::fixed_list(vec![CourseEntry::new(
        EntityId::new(4),
        10,
        0,
    )])));
    course.add_course_resource(sample_course_resource());
    course.add_result_feedback_mapping(ResultFeedbackMapping::new(
        EvaluatorExpression::math("score >= 0.5"),
        "passed",
        "Well done.",
    ));
    course.set_folder(Some(Arc::new(ContentFolder::new("WS 21/22"))));
    course.set_subject(Some(Arc::new(Subject::new("Mathematics"))));
    course.meta_mut().assign_storage_id(EntityId::new(94));
    course.meta_mut().touch();
    course.meta_mut().set_updated_by("alice");
    course
}

fn verify_course() -> Result<(), String> {
    let original = sample_course();
    let copy = original.deep_copy().map_err(|e| e.to_string())?;

    check(
        "name",
        copy.name() == original.name() && distinct_str(copy.name(), original.name()),
    )?;
    check(
        "external_description",
        copy.external_description() == original.external_description(),
    )?;
    check(
        "internal_description",
        copy.internal_description() == original.internal_description(),
    )?;
    check("language", copy.language() == original.language())?;
    check("valid", copy.is_valid() == original.is_valid())?;
    check("scoring_mode", copy.scoring_mode() == original.scoring_mode())?;
    check(
        "exercise_order",
        copy.exercise_order() == original.exercise_order(),
    )?;
    check(
        "content_provider",
        match (copy.content_provider(), original.content_provider()) {
            // a copied provider is new content: same entries, no identity
            (Some(a), Some(b)) => a.entries() == b.entries() && a.meta().is_transient(),
            _ => false,
        },
    )?;
    check(
        "course_resources",
        copy.course_resources().len() == original.course_resources().len()
            && copy.course_resources().as_ptr() != original.course_resources().as_ptr()
            && copy.course_resources()[0].filename() == original.course_resources()[0].filename(),
    )?;
    check(
        "result_feedback_mappings",
        copy.result_feedback_mappings() == original.result_feedback_mappings()
            && copy.result_feedback_mappings().as_ptr()
                != original.result_feedback_mappings().as_ptr(),
    )?;
    // reference-only
    check(
        "folder",
        match (copy.folder(), original.folder()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        },
    )?;
    check(
        "subject",
        match (copy.subject(), original.subject()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        },
    )?;
    // excluded
    check("meta.storage_id", copy.meta().is_transient())?;
    check("meta.updated_at", copy.meta().updated_at().is_none())?;
    check("meta.updated_by", copy.meta().updated_by() == Some("alice"))
}

fn sample_exercise() -> Exercise {
    let mut exercise = Exercise::new("Integration by parts");
    exercise.set_public_description(Some("Integrate the given function".into()));
    exercise.set_internal_notes(Some("used in the midterm".into()));
    exercise.set_language(Some("en".into()));
    exercise.set_difficulty(7);
    exercise.set_valid(true);
    exercise.add_tag(Arc::new(Tag::new("calculus")));
    exercise.add_exercise_resource(ExerciseResource::new(
        "plot.png",
        vec![0x89, 0x50, 0x4e, 0x47],
        Some(Arc::new(User::new("alice"))),
    ));
    let intro = exercise.add_stage("intro");
    let calc = exercise.add_stage("calculation");
    if let Some(stage) = exercise.stage_mut(intro) {
        stage.set_default_transition(StageTransition::to(calc));
    }
    exercise.add_variable(VariableDeclaration::with_initialization(
        "a",
        EvaluatorExpression::math("randint(1, 10)"),
    ));
    exercise.add_result_feedback_mapping(ResultFeedbackMapping::new(
        EvaluatorExpression::math("score >= 0.5"),
        "passed",
        "Well done.",
    ));
    exercise.generate_suffix_weights();
    exercise.meta_mut().assign_storage_id(EntityId::new(95));
    exercise.meta_mut().touch();
    exercise
}

fn verify_exercise() -> Result<(), String> {
    let original = sample_exercise();
    let copy = original.deep_copy().map_err(|e| e.to_string())?;

    check(
        "name",
        copy.name() == original.name() && distinct_str(copy.name(), original.name()),
    )?;
    check(
        "public_description",
        copy.public_description() == original.public_description(),
    )?;
    check(
        "internal_notes",
        copy.internal_notes() == original.internal_notes(),
    )?;
    check("language", copy.language() == original.language())?;
    check("difficulty", copy.difficulty() == original.difficulty())?;
    check("valid", copy.is_valid() == original.is_valid())?;
    // reference-only
    check(
        "tags",
        copy.tags().len() == original.tags().len()
            && Arc::ptr_eq(&copy.tags()[0], &original.tags()[0]),
    )?;
    check(
        "resources",
        copy.exercise_resources().len() == original.exercise_resources().len()
            && copy.exercise_resources().as_ptr() != original.exercise_resources().as_ptr(),
    )?;
    check(
        "stages",
        copy.stages() == original.stages()
            && copy.stages().as_ptr() != original.stages().as_ptr(),
    )?;
    check("start_stage", copy.start_stage() == original.start_stage())?;
    check(
        "variable_declarations",
        copy.variable_declarations() == original.variable_declarations()
            && copy.variable_declarations().as_ptr()
                != original.variable_declarations().as_ptr(),
    )?;
    check(
        "result_feedback_mappings",
        copy.result_feedback_mappings() == original.result_feedback_mappings(),
    )?;
    // excluded
    check("suffix_weights", copy.suffix_weights().is_empty())?;
    check("meta.storage_id", copy.meta().is_transient())?;
    check("meta.updated_at", copy.meta().updated_at().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_populated() {
        assert!(contracts().len() >= 10);
    }

    #[test]
    fn test_registry_has_no_duplicate_types() {
        let mut names: Vec<_> = contracts().iter().map(|c| c.type_name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), contracts().len());
    }
}
