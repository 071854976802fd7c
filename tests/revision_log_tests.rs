//! Revision log tests
//!
//! Monotonic gapped numbering, whole-graph change detection, point-in-time
//! materialization and the paged history query.
//! Run with: cargo test --test revision_log_tests

use revstore::content::{Course, CourseContent, Exercise};
use revstore::{
    ContentStore, RevisionError, RevisionKind, RevisionNumber, RevisionQuery, SortField, SortOrder,
};

fn commit_course(store: &ContentStore, course: Course) -> Course {
    store
        .transaction(|tx| {
            tx.set_author("alice");
            tx.merge_course(course)
        })
        .unwrap()
}

#[test]
fn numbers_are_strictly_increasing_and_materialize_exactly() {
    let store = ContentStore::new();

    let v0 = commit_course(&store, Course::new("C"));
    let entity = v0.entity_ref().unwrap();
    let id = v0.id().unwrap();

    let mut edit = v0.clone();
    edit.set_name("C2");
    let v1 = commit_course(&store, edit);

    let mut edit = v1.clone();
    edit.set_name("C3");
    let v2 = commit_course(&store, edit);

    store
        .read(|tx| {
            let numbers = tx.log().numbers_for(entity);
            assert_eq!(numbers.len(), 3);
            assert!(numbers[0] < numbers[1] && numbers[1] < numbers[2]);

            for (number, expected) in numbers.iter().zip([&v0, &v1, &v2]) {
                let historical = tx.log().materialize_course(id, *number)?;
                assert_eq!(historical.content(), *expected);
            }
            assert_eq!(tx.log().latest(entity), numbers[2]);
            Ok(())
        })
        .unwrap();
}

#[test]
fn interleaved_entities_produce_gapped_sequences() {
    let store = ContentStore::new();

    let course = commit_course(&store, Course::new("C"));
    let exercise = store
        .transaction(|tx| tx.merge_exercise(Exercise::new("E")))
        .unwrap();

    let mut edit = course.clone();
    edit.set_name("C2");
    commit_course(&store, edit);

    let mut edit = exercise.clone();
    edit.set_name("E2");
    store.transaction(|tx| tx.merge_exercise(edit)).unwrap();

    store
        .read(|tx| {
            let course_numbers = tx.log().numbers_for(course.entity_ref().unwrap());
            let exercise_numbers = tx.log().numbers_for(exercise.entity_ref().unwrap());
            assert_eq!(course_numbers.len(), 2);
            assert_eq!(exercise_numbers.len(), 2);
            // the exercise commits claimed numbers in between
            assert!(course_numbers[1].raw() - course_numbers[0].raw() > 1);
            assert!(exercise_numbers[0] > course_numbers[0]);
            Ok(())
        })
        .unwrap();
}

#[test]
fn unchanged_merge_appends_nothing_forced_recording_does() {
    let store = ContentStore::new();
    let course = commit_course(&store, Course::new("C"));
    let entity = course.entity_ref().unwrap();
    let id = course.id().unwrap();

    // same graph again: no revision
    commit_course(&store, course.clone());
    store
        .read(|tx| {
            assert_eq!(tx.log().numbers_for(entity).len(), 1);
            Ok(())
        })
        .unwrap();

    // the explicit capability records regardless
    store
        .transaction(|tx| tx.record_course_revision(id))
        .unwrap();
    store
        .read(|tx| {
            assert_eq!(tx.log().numbers_for(entity).len(), 2);
            Ok(())
        })
        .unwrap();
}

#[test]
fn point_in_time_resolves_to_latest_at_or_before() {
    let store = ContentStore::new();
    let course = commit_course(&store, Course::new("C"));
    let entity = course.entity_ref().unwrap();
    let id = course.id().unwrap();

    let mut edit = course.clone();
    edit.set_name("C2");
    commit_course(&store, edit);

    store
        .read(|tx| {
            let history = tx.log().all_revisions(entity);
            let first_committed_at = history[0].record.timestamp;
            let second_committed_at = history[1].record.timestamp;

            let at_first = tx.log().materialize_course_at(id, first_committed_at)?;
            assert_eq!(at_first.content().name(), "C");

            let at_second = tx.log().materialize_course_at(id, second_committed_at)?;
            assert_eq!(at_second.content().name(), "C2");
            Ok(())
        })
        .unwrap();
}

#[test]
fn paged_query_sorts_and_slices() {
    let store = ContentStore::new();
    let mut course = commit_course(&store, Course::new("C"));
    let entity = course.entity_ref().unwrap();

    for name in ["C2", "C3", "C4"] {
        course.set_name(name);
        course = commit_course(&store, course);
    }

    store
        .read(|tx| {
            let query = RevisionQuery::page(0, 2)
                .sorted_by(SortField::Number, SortOrder::Descending)
                .with_graph();
            let page = tx.log().page(entity, &query);
            assert_eq!(page.len(), 2);
            assert!(page[0].record.number > page[1].record.number);
            assert_eq!(page[0].graph.as_ref().unwrap().name(), "C4");

            // metadata-only paging leaves the graph out
            let plain = tx.log().page(entity, &RevisionQuery::page(2, 10));
            assert_eq!(plain.len(), 2);
            assert!(plain[0].graph.is_none());
            Ok(())
        })
        .unwrap();
}

#[test]
fn unknown_revision_is_rejected() {
    let store = ContentStore::new();
    let course = commit_course(&store, Course::new("C"));
    let id = course.id().unwrap();

    let err = store
        .read(|tx| tx.log().materialize_course(id, RevisionNumber::new(99_999)))
        .unwrap_err();
    assert!(matches!(err, RevisionError::UnknownRevision { .. }));
}

#[test]
fn unknown_entity_is_not_found() {
    let store = ContentStore::new();
    // an id that was never used for a course
    let exercise = store
        .transaction(|tx| tx.merge_exercise(Exercise::new("E")))
        .unwrap();

    let err = store
        .read(|tx| {
            tx.log()
                .materialize_course(exercise.id().unwrap(), RevisionNumber::new(1))
        })
        .unwrap_err();
    assert!(matches!(err, RevisionError::NotFound(_)));
}

#[test]
fn deletion_records_final_state_and_keeps_history_readable() {
    let store = ContentStore::new();
    let course = commit_course(&store, Course::new("C"));
    let entity = course.entity_ref().unwrap();
    let id = course.id().unwrap();

    let mut edit = course.clone();
    edit.set_name("C2");
    commit_course(&store, edit);

    store.transaction(|tx| tx.delete_course(id)).unwrap();

    store
        .read(|tx| {
            assert!(tx.find_course(id).is_none());

            let history = tx.log().all_revisions(entity);
            assert_eq!(history.len(), 3);
            assert_eq!(history[2].record.kind, RevisionKind::Del);

            let deleted = tx.log().last_deleted(entity).unwrap();
            assert_eq!(deleted.name(), "C2");

            // older revisions stay materializable after the hard delete
            let first = tx.log().numbers_for(entity)[0];
            assert_eq!(tx.log().materialize_course(id, first)?.content().name(), "C");
            Ok(())
        })
        .unwrap();
}

#[test]
fn failing_transaction_rolls_back_revisions_and_content() {
    let store = ContentStore::new();
    let course = commit_course(&store, Course::new("C"));
    let entity = course.entity_ref().unwrap();

    let result: revstore::Result<()> = store.transaction(|tx| {
        let mut edit = tx.find_course(course.id().unwrap()).unwrap();
        edit.set_name("never committed");
        tx.merge_course(edit)?;
        Err(RevisionError::IllegalState("forced failure".into()))
    });
    assert!(result.is_err());

    store
        .read(|tx| {
            assert_eq!(tx.log().numbers_for(entity).len(), 1);
            assert_eq!(tx.find_course(course.id().unwrap()).unwrap().name(), "C");
            Ok(())
        })
        .unwrap();
}

#[test]
fn revision_records_carry_author_and_serialize() {
    let store = ContentStore::new();
    let course = commit_course(&store, Course::new("C"));
    let entity = course.entity_ref().unwrap();

    store
        .read(|tx| {
            let history = tx.log().all_revisions(entity);
            let record = &history[0].record;
            assert_eq!(record.author.as_deref(), Some("alice"));
            assert_eq!(record.kind, RevisionKind::Add);

            let json = serde_json::to_value(record).unwrap();
            assert_eq!(json["author"], "alice");
            Ok(())
        })
        .unwrap();
}
