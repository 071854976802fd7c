//! Usage context tests
//!
//! A usage context (course record, submission) references either the live
//! aggregate or a frozen snapshot; once assigned, a frozen reference must
//! keep resolving to the exact same state forever.
//! Run with: cargo test --test usage_context_tests

use revstore::content::{
    Course, CourseContent, CourseRecord, CourseRef, Exercise, ExerciseContent, ExerciseRef,
    Submission,
};
use revstore::{ContentStore, SnapshotFreezer};

#[test]
fn a_record_pinned_to_a_snapshot_never_sees_later_edits() {
    let store = ContentStore::new();
    let freezer = SnapshotFreezer::new();

    let course = store
        .transaction(|tx| {
            tx.set_author("alice");
            tx.merge_course(Course::new("Analysis I"))
        })
        .unwrap();
    let id = course.id().unwrap();
    let entity = course.entity_ref().unwrap();

    let frozen = store
        .transaction(|tx| {
            let revision = tx.log().numbers_for(entity)[0];
            freezer.freeze_course(tx, id, revision)
        })
        .unwrap();

    let pinned_record = CourseRecord::new(CourseRef::Frozen(frozen.id().unwrap()));
    let live_record = CourseRecord::new(CourseRef::Live(id));

    // the lecturer keeps editing
    let mut edit = course;
    edit.set_name("Analysis I (reworked)");
    store.transaction(|tx| tx.merge_course(edit)).unwrap();

    store
        .read(|tx| {
            let pinned = tx.resolve_course_ref(&pinned_record.course_ref())?;
            assert!(pinned.is_frozen());
            assert_eq!(pinned.name(), "Analysis I");

            let live = tx.resolve_course_ref(&live_record.course_ref())?;
            assert!(!live.is_frozen());
            assert_eq!(live.name(), "Analysis I (reworked)");
            Ok(())
        })
        .unwrap();
}

#[test]
fn a_submission_keeps_its_frozen_exercise() {
    let store = ContentStore::new();
    let freezer = SnapshotFreezer::new();

    let exercise = store
        .transaction(|tx| tx.merge_exercise(Exercise::new("Exercise 1.0")))
        .unwrap();
    let id = exercise.id().unwrap();
    let entity = exercise.entity_ref().unwrap();

    let frozen = store
        .transaction(|tx| {
            let revision = tx.log().numbers_for(entity)[0];
            freezer.freeze_exercise(tx, id, revision)
        })
        .unwrap();

    let submission = Submission::new(ExerciseRef::Frozen(frozen.id().unwrap()));
    assert!(submission.exercise_ref().is_frozen());

    let mut edit = exercise;
    edit.set_name("Exercise 2.0");
    store.transaction(|tx| tx.merge_exercise(edit)).unwrap();

    store
        .read(|tx| {
            let resolved = tx.resolve_exercise_ref(&submission.exercise_ref())?;
            assert_eq!(resolved.name(), "Exercise 1.0");
            Ok(())
        })
        .unwrap();
}

#[test]
fn usage_references_serialize_with_their_variant() {
    let record = CourseRecord::new(CourseRef::Live(
        // obtain a real id through the store
        {
            let store = ContentStore::new();
            let course = store
                .transaction(|tx| tx.merge_course(Course::new("Analysis I")))
                .unwrap();
            course.id().unwrap()
        },
    ));

    let json = serde_json::to_value(&record).unwrap();
    assert!(json["course"]["Live"].is_number());
}
