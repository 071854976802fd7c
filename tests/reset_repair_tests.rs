//! Reset and reference repair tests
//!
//! Time travel restores a prior state as the new head without rewriting
//! history, repairing provider references that have since been superseded
//! and replacing history-backed resources with fresh copies.
//! Run with: cargo test --test reset_repair_tests

use revstore::content::{
    Course, CourseContent, CourseEntry, CourseResource, CourseVersion, Exercise, ExerciseContent,
    ExerciseProvider, ExerciseVersion,
};
use revstore::{ContentStore, RevisionError, RevisionNavigator, RevisionNumber, SnapshotFreezer};

fn commit_course(store: &ContentStore, course: Course) -> Course {
    store
        .transaction(|tx| {
            tx.set_author("alice");
            tx.merge_course(course)
        })
        .unwrap()
}

#[test]
fn reset_restores_a_prior_state_as_a_new_revision() {
    let store = ContentStore::new();
    let navigator = RevisionNavigator::new();

    let course = commit_course(&store, Course::new("C"));
    let entity = course.entity_ref().unwrap();
    let id = course.id().unwrap();

    let mut edit = course.clone();
    edit.set_name("C2");
    let edit = commit_course(&store, edit);
    let mut edit = edit;
    edit.set_name("C3");
    commit_course(&store, edit);

    let numbers = store.read(|tx| Ok(tx.log().numbers_for(entity))).unwrap();
    assert_eq!(numbers.len(), 3);

    store
        .read(|tx| {
            let historical = tx.log().materialize_course(id, numbers[0])?;
            assert_eq!(historical.content().name(), "C");
            Ok(())
        })
        .unwrap();

    let restored = store
        .transaction(|tx| {
            let reset = navigator.reset_course(tx, id, numbers[0])?;
            tx.merge_course(reset)
        })
        .unwrap();
    assert_eq!(restored.name(), "C");
    assert_eq!(restored.id(), Some(id));

    store
        .read(|tx| {
            // history gained a revision, nothing was rewritten
            let numbers_after = tx.log().numbers_for(entity);
            assert_eq!(numbers_after.len(), 4);
            assert_eq!(numbers_after[..3], numbers[..]);
            assert_eq!(tx.find_course(id).unwrap().name(), "C");
            Ok(())
        })
        .unwrap();
}

#[test]
fn reset_to_the_current_head_still_records_a_revision() {
    let store = ContentStore::new();
    let navigator = RevisionNavigator::new();

    let course = commit_course(&store, Course::new("C"));
    let entity = course.entity_ref().unwrap();
    let id = course.id().unwrap();

    let head = store.read(|tx| Ok(tx.log().latest(entity))).unwrap();
    store
        .transaction(|tx| {
            let reset = navigator.reset_course(tx, id, head)?;
            tx.merge_course(reset)
        })
        .unwrap();

    store
        .read(|tx| {
            assert_eq!(tx.log().numbers_for(entity).len(), 2);
            Ok(())
        })
        .unwrap();
}

#[test]
fn superseded_provider_is_reinserted_as_new_content() {
    let store = ContentStore::new();
    let navigator = RevisionNavigator::new();

    let (course, exercise_id) = store
        .transaction(|tx| {
            tx.set_author("alice");
            let exercise = tx.merge_exercise(Exercise::new("E"))?;
            let mut course = Course::new("C");
            course.set_content_provider(Some(ExerciseProvider::fixed_list(vec![
                CourseEntry::new(exercise.id().unwrap(), 10, 0),
            ])));
            Ok((tx.merge_course(course)?, exercise.id().unwrap()))
        })
        .unwrap();
    let id = course.id().unwrap();
    let entity = course.entity_ref().unwrap();
    let old_provider_id = course
        .content_provider()
        .unwrap()
        .meta()
        .storage_id()
        .unwrap();

    // the fixed list is replaced by a different provider, superseding P1
    let mut edit = course.clone();
    edit.set_content_provider(Some(ExerciseProvider::fixed_list(vec![CourseEntry::new(
        exercise_id,
        20,
        0,
    )])));
    commit_course(&store, edit);

    store
        .read(|tx| {
            assert!(!tx.provider_exists(old_provider_id));
            Ok(())
        })
        .unwrap();

    // resetting to the first revision must not dangle on P1's old id
    let first = store
        .read(|tx| Ok(tx.log().numbers_for(entity)[0]))
        .unwrap();
    let restored = store
        .transaction(|tx| {
            let reset = navigator.reset_course(tx, id, first)?;
            // the repaired provider lost its superseded identity
            assert!(reset.content_provider().unwrap().meta().is_transient());
            tx.merge_course(reset)
        })
        .unwrap();

    let new_provider = restored.content_provider().unwrap();
    let new_provider_id = new_provider.meta().storage_id().unwrap();
    assert_ne!(new_provider_id, old_provider_id);
    assert_eq!(new_provider.entries().unwrap()[0].points, 10);
    store
        .read(|tx| {
            assert!(tx.provider_exists(new_provider_id));
            Ok(())
        })
        .unwrap();
}

#[test]
fn still_existing_provider_is_reused_unchanged() {
    let store = ContentStore::new();
    let navigator = RevisionNavigator::new();

    let course = store
        .transaction(|tx| {
            let mut course = Course::new("C");
            course.set_content_provider(Some(ExerciseProvider::fixed_list(vec![])));
            tx.merge_course(course)
        })
        .unwrap();
    let id = course.id().unwrap();
    let entity = course.entity_ref().unwrap();
    let provider_id = course
        .content_provider()
        .unwrap()
        .meta()
        .storage_id()
        .unwrap();

    let mut edit = course.clone();
    edit.set_name("C2");
    commit_course(&store, edit);

    let first = store
        .read(|tx| Ok(tx.log().numbers_for(entity)[0]))
        .unwrap();
    let restored = store
        .transaction(|tx| {
            let reset = navigator.reset_course(tx, id, first)?;
            tx.merge_course(reset)
        })
        .unwrap();

    assert_eq!(
        restored.content_provider().unwrap().meta().storage_id(),
        Some(provider_id)
    );
}

#[test]
fn history_backed_resources_are_replaced_by_fresh_copies() {
    let store = ContentStore::new();
    let navigator = RevisionNavigator::new();

    let mut course = Course::new("C");
    course.add_course_resource(CourseResource::new("notes.txt", b"v1".to_vec(), None));
    let course = commit_course(&store, course);
    let id = course.id().unwrap();
    let entity = course.entity_ref().unwrap();
    let old_resource_id = course.course_resources()[0].meta().storage_id().unwrap();

    let mut edit = course.clone();
    edit.remove_course_resource("notes.txt");
    commit_course(&store, edit);

    let first = store
        .read(|tx| Ok(tx.log().numbers_for(entity)[0]))
        .unwrap();
    let restored = store
        .transaction(|tx| {
            let reset = navigator.reset_course(tx, id, first)?;
            // the restored resource is new content, not the history row
            assert!(reset.course_resources()[0].meta().is_transient());
            tx.merge_course(reset)
        })
        .unwrap();

    let resource = &restored.course_resources()[0];
    assert_eq!(resource.filename(), "notes.txt");
    assert_eq!(resource.content(), b"v1");
    assert_ne!(resource.meta().storage_id().unwrap(), old_resource_id);
}

#[test]
fn reset_of_an_exercise_restores_stages() {
    let store = ContentStore::new();
    let navigator = RevisionNavigator::new();

    let exercise = store
        .transaction(|tx| {
            let mut exercise = Exercise::new("E");
            exercise.add_stage("intro");
            tx.merge_exercise(exercise)
        })
        .unwrap();
    let id = exercise.id().unwrap();
    let entity = exercise.entity_ref().unwrap();

    let mut edit = exercise.clone();
    let removed = edit.stages()[0].local_id();
    edit.remove_stage(removed);
    store.transaction(|tx| tx.merge_exercise(edit)).unwrap();

    let first = store
        .read(|tx| Ok(tx.log().numbers_for(entity)[0]))
        .unwrap();
    let restored = store
        .transaction(|tx| {
            let reset = navigator.reset_exercise(tx, id, first)?;
            tx.merge_exercise(reset)
        })
        .unwrap();
    assert_eq!(restored.stages().len(), 1);
    assert_eq!(restored.stages()[0].name(), "intro");
}

#[test]
fn reset_with_an_unknown_revision_is_rejected() {
    let store = ContentStore::new();
    let navigator = RevisionNavigator::new();
    let course = commit_course(&store, Course::new("C"));

    let err = store
        .transaction(|tx| {
            navigator.reset_course(tx, course.id().unwrap(), RevisionNumber::new(99_999))
        })
        .unwrap_err();
    assert!(matches!(err, RevisionError::UnknownRevision { .. }));
}

#[test]
fn proxied_or_last_revision_is_polymorphic_over_provenance() {
    let store = ContentStore::new();
    let navigator = RevisionNavigator::new();
    let freezer = SnapshotFreezer::new();

    let course = commit_course(&store, Course::new("C"));
    let entity = course.entity_ref().unwrap();
    let id = course.id().unwrap();

    let mut edit = course.clone();
    edit.set_name("C2");
    commit_course(&store, edit);

    let numbers = store.read(|tx| Ok(tx.log().numbers_for(entity))).unwrap();
    let frozen = store
        .transaction(|tx| freezer.freeze_course(tx, id, numbers[0]))
        .unwrap();

    store
        .read(|tx| {
            // live and persisted: the latest number
            let live = CourseVersion::Live(tx.find_course(id).unwrap());
            assert_eq!(
                navigator.proxied_or_last_revision_course(tx, &live)?,
                numbers[1]
            );
            assert!(!live.is_frozen() && !live.is_from_history());

            // frozen: the pinned revision, no lookup
            let frozen_version = CourseVersion::Frozen(frozen.clone());
            assert_eq!(
                navigator.proxied_or_last_revision_course(tx, &frozen_version)?,
                numbers[0]
            );
            assert!(frozen_version.is_frozen());

            // transient: the sentinel
            let transient = CourseVersion::Live(Course::new("draft"));
            assert!(
                navigator
                    .proxied_or_last_revision_course(tx, &transient)?
                    .is_unpersisted()
            );

            // historical view: ill-posed
            let historical =
                CourseVersion::Historical(tx.log().materialize_course(id, numbers[0])?);
            assert!(historical.is_from_history());
            let err = navigator
                .proxied_or_last_revision_course(tx, &historical)
                .unwrap_err();
            assert!(matches!(err, RevisionError::HistoricalView(_)));
            Ok(())
        })
        .unwrap();
}

#[test]
fn proxied_or_last_revision_for_exercises() {
    let store = ContentStore::new();
    let navigator = RevisionNavigator::new();

    let exercise = store
        .transaction(|tx| tx.merge_exercise(Exercise::new("E")))
        .unwrap();
    let entity = exercise.entity_ref().unwrap();

    store
        .read(|tx| {
            let live = ExerciseVersion::Live(tx.find_exercise(exercise.id().unwrap()).unwrap());
            let number = navigator.proxied_or_last_revision_exercise(tx, &live)?;
            assert_eq!(number, tx.log().numbers_for(entity)[0]);

            let transient = ExerciseVersion::Live(Exercise::new("draft"));
            assert!(
                navigator
                    .proxied_or_last_revision_exercise(tx, &transient)?
                    .is_unpersisted()
            );
            Ok(())
        })
        .unwrap();
}
