//! Developer tooling for exploring the revision store.
//!
//! Seeds an in-memory store with a small editing session and prints
//! revision histories, materialized states or frozen snapshots as JSON.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use revstore::content::{Course, CourseContent, CourseEntry, Exercise, ExerciseProvider};
use revstore::{
    ContentStore, EntityId, EntityRef, RevisionNavigator, RevisionNumber, RevisionQuery,
    SnapshotFreezer, SortField, SortOrder,
};

#[derive(Parser)]
#[command(name = "revision-tool")]
#[command(about = "Developer tooling for the revision store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the revision history of the seeded demo course.
    History {
        /// Page offset into the history.
        #[arg(long, default_value_t = 0)]
        first: usize,
        /// Page size.
        #[arg(long, default_value_t = 20)]
        page_size: usize,
        /// Sort newest first.
        #[arg(long)]
        newest_first: bool,
    },
    /// Materialize one revision of the demo course (0-based index into its
    /// revision list).
    Show {
        #[arg(long)]
        index: usize,
    },
    /// Freeze a revision of the demo course and print the snapshot.
    Freeze {
        #[arg(long)]
        index: usize,
    },
    /// Reset the demo course to a revision and print the recommitted head.
    Reset {
        #[arg(long)]
        index: usize,
    },
}

/// Replays a small authoring session: an exercise, a course pointing at
/// it, a rename and a provider swap.
fn seed(store: &ContentStore) -> Result<(EntityId, EntityId)> {
    let ids = store.transaction(|tx| {
        tx.set_author("alice");

        let mut exercise = Exercise::new("Integration by parts");
        exercise.set_difficulty(5);
        exercise.add_stage("intro");
        let exercise = tx.merge_exercise(exercise)?;
        let exercise_id = exercise.id().expect("merged exercise has an id");

        let mut course = Course::new("Analysis I");
        course.set_content_provider(Some(ExerciseProvider::fixed_list(vec![CourseEntry::new(
            exercise_id,
            10,
            0,
        )])));
        let course = tx.merge_course(course)?;
        let course_id = course.id().expect("merged course has an id");

        let mut renamed = course;
        renamed.set_name("Analysis I (WS 21/22)");
        tx.merge_course(renamed)?;

        Ok((course_id, exercise_id))
    })?;
    Ok(ids)
}

fn revision_at_index(
    store: &ContentStore,
    entity: EntityRef,
    index: usize,
) -> Result<RevisionNumber> {
    let numbers = store.read(|tx| Ok(tx.log().numbers_for(entity)))?;
    match numbers.get(index) {
        Some(number) => Ok(*number),
        None => bail!(
            "revision index {index} out of range, {entity} has {} revisions",
            numbers.len()
        ),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let store = ContentStore::new();
    let (course_id, _exercise_id) = seed(&store).context("failed to seed the demo store")?;
    let entity = EntityRef::course(course_id);

    match cli.command {
        Command::History {
            first,
            page_size,
            newest_first,
        } => {
            let mut query = RevisionQuery::page(first, page_size).with_graph();
            if newest_first {
                query = query.sorted_by(SortField::Number, SortOrder::Descending);
            }
            let entries = store.read(|tx| Ok(tx.log().page(entity, &query)))?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Command::Show { index } => {
            let number = revision_at_index(&store, entity, index)?;
            let historical =
                store.read(|tx| tx.log().materialize_course(course_id, number))?;
            println!("{}", serde_json::to_string_pretty(historical.content())?);
        }
        Command::Freeze { index } => {
            let number = revision_at_index(&store, entity, index)?;
            let freezer = SnapshotFreezer::new();
            let frozen = store.transaction(|tx| freezer.freeze_course(tx, course_id, number))?;
            println!(
                "frozen course {} pinned to revision {} of course {}: {}",
                frozen.id().expect("persisted snapshot has an id"),
                frozen.proxied_revision(),
                frozen.proxied_course_id(),
                frozen.name(),
            );
        }
        Command::Reset { index } => {
            let number = revision_at_index(&store, entity, index)?;
            let navigator = RevisionNavigator::new();
            let restored = store.transaction(|tx| {
                let reset = navigator.reset_course(tx, course_id, number)?;
                tx.merge_course(reset)
            })?;
            println!(
                "course {} reset to revision {}, head is now \"{}\"",
                course_id,
                number,
                restored.name(),
            );
        }
    }
    Ok(())
}
