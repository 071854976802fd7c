// ============================================================================
// Revision Log
// ============================================================================
//
// Append-only ledger of committed states per content entity, the single
// source of truth for historical state. Revision numbers come from one
// store-global clock: per-entity sequences are strictly increasing and may
// have gaps when other entities commit in between. Appended entries are
// never mutated or removed.
//
// Only the snapshot freezer and the revision navigator read this log
// directly; everything else goes through them.
//
// ============================================================================

use crate::content::version::{HistoricalCourse, HistoricalExercise};
use crate::core::error::{Result, RevisionError};
use crate::core::id::{EntityId, EntityRef, RevisionNumber};
use crate::revision::record::{
    ContentGraph, RevisionEntry, RevisionKind, RevisionQuery, RevisionRecord, SortField, SortOrder,
};
use chrono::{DateTime, Utc};
use log::warn;
use std::sync::Arc;

#[derive(Debug)]
struct StoredRevision {
    record: RevisionRecord,
    graph: ContentGraph,
    // serialized form of the graph, kept so the next commit can compare
    // against it without re-serializing history
    fingerprint: serde_json::Value,
}

/// The append-only revision ledger.
///
/// Clones share structure with the original; this is what makes the
/// transaction snapshot of the whole store cheap.
#[derive(Debug, Clone, Default)]
pub struct RevisionLog {
    clock: u64,
    ledgers: im::HashMap<EntityRef, im::Vector<Arc<StoredRevision>>>,
}

impl RevisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_number(&mut self) -> RevisionNumber {
        self.clock += 1;
        RevisionNumber::new(self.clock)
    }

    fn ledger(&self, entity: EntityRef) -> Option<&im::Vector<Arc<StoredRevision>>> {
        self.ledgers.get(&entity)
    }

    fn find(&self, entity: EntityRef, revision: RevisionNumber) -> Result<&Arc<StoredRevision>> {
        let ledger = self
            .ledger(entity)
            .ok_or(RevisionError::NotFound(entity))?;
        ledger
            .iter()
            .find(|stored| stored.record.number == revision)
            .ok_or(RevisionError::UnknownRevision { entity, revision })
    }

    /// Appends a revision unconditionally and returns its number.
    pub(crate) fn append(
        &mut self,
        kind: RevisionKind,
        graph: ContentGraph,
        author: Option<String>,
    ) -> Result<RevisionNumber> {
        let entity = graph.entity_ref().ok_or_else(|| {
            RevisionError::IllegalState("cannot record a revision for a transient entity".into())
        })?;
        let fingerprint = serde_json::to_value(&graph)?;
        let number = self.next_number();
        let stored = Arc::new(StoredRevision {
            record: RevisionRecord {
                entity,
                number,
                kind,
                timestamp: Utc::now(),
                author,
            },
            graph,
            fingerprint,
        });
        let mut ledger = self.ledgers.get(&entity).cloned().unwrap_or_default();
        ledger.push_back(stored);
        self.ledgers.insert(entity, ledger);
        Ok(number)
    }

    /// Appends a revision iff the committed graph differs from its stored
    /// predecessor (whole-graph comparison). Returns the new number, or
    /// `None` when nothing changed.
    pub(crate) fn append_if_changed(
        &mut self,
        graph: ContentGraph,
        author: Option<String>,
    ) -> Result<Option<RevisionNumber>> {
        let entity = graph.entity_ref().ok_or_else(|| {
            RevisionError::IllegalState("cannot record a revision for a transient entity".into())
        })?;
        let fingerprint = serde_json::to_value(&graph)?;

        let kind = match self.ledger(entity).and_then(|l| l.last()) {
            Some(last) if !last.record.kind.is_deletion() => {
                if last.fingerprint == fingerprint {
                    return Ok(None);
                }
                RevisionKind::Mod
            }
            // first commit, or re-created after deletion
            _ => RevisionKind::Add,
        };
        self.append(kind, graph, author).map(Some)
    }

    /// Ascending revision numbers of the entity. Not necessarily starting
    /// at the clock's first tick and possibly gapped.
    pub fn numbers_for(&self, entity: EntityRef) -> Vec<RevisionNumber> {
        self.ledger(entity)
            .map(|ledger| ledger.iter().map(|stored| stored.record.number).collect())
            .unwrap_or_default()
    }

    /// Most recent revision number of the entity. For an entity without any
    /// recorded history this returns the unpersisted sentinel and logs a
    /// warning instead of failing.
    pub fn latest(&self, entity: EntityRef) -> RevisionNumber {
        match self.ledger(entity).and_then(|l| l.last()) {
            Some(stored) => stored.record.number,
            None => {
                warn!("Asked for the latest revision of {entity} which has no history, returning 0");
                RevisionNumber::UNPERSISTED
            }
        }
    }

    pub fn contains(&self, entity: EntityRef, revision: RevisionNumber) -> bool {
        self.find(entity, revision).is_ok()
    }

    /// Materializes the course graph at the given revision, deep-initialized
    /// and tagged with its provenance.
    pub fn materialize_course(
        &self,
        id: EntityId,
        revision: RevisionNumber,
    ) -> Result<HistoricalCourse> {
        let entity = EntityRef::course(id);
        let stored = self.find(entity, revision)?;
        match stored.graph.as_course() {
            Some(course) => Ok(HistoricalCourse::new(revision, course.clone())),
            None => Err(RevisionError::IllegalState(format!(
                "revision {revision} of {entity} does not hold a course graph"
            ))),
        }
    }

    pub fn materialize_exercise(
        &self,
        id: EntityId,
        revision: RevisionNumber,
    ) -> Result<HistoricalExercise> {
        let entity = EntityRef::exercise(id);
        let stored = self.find(entity, revision)?;
        match stored.graph.as_exercise() {
            Some(exercise) => Ok(HistoricalExercise::new(revision, exercise.clone())),
            None => Err(RevisionError::IllegalState(format!(
                "revision {revision} of {entity} does not hold an exercise graph"
            ))),
        }
    }

    fn revision_at(&self, entity: EntityRef, timestamp: DateTime<Utc>) -> Result<RevisionNumber> {
        let ledger = self
            .ledger(entity)
            .ok_or(RevisionError::NotFound(entity))?;
        ledger
            .iter()
            .filter(|stored| stored.record.timestamp <= timestamp)
            .next_back()
            .map(|stored| stored.record.number)
            .ok_or_else(|| {
                RevisionError::IllegalState(format!(
                    "no revision of {entity} at or before {timestamp}"
                ))
            })
    }

    /// Materializes the newest course revision at or before the timestamp.
    pub fn materialize_course_at(
        &self,
        id: EntityId,
        timestamp: DateTime<Utc>,
    ) -> Result<HistoricalCourse> {
        let revision = self.revision_at(EntityRef::course(id), timestamp)?;
        self.materialize_course(id, revision)
    }

    pub fn materialize_exercise_at(
        &self,
        id: EntityId,
        timestamp: DateTime<Utc>,
    ) -> Result<HistoricalExercise> {
        let revision = self.revision_at(EntityRef::exercise(id), timestamp)?;
        self.materialize_exercise(id, revision)
    }

    /// All revisions of the entity with eagerly materialized graphs. This
    /// can be slow for long histories; history tables should page with
    /// [`RevisionLog::page`] instead.
    pub fn all_revisions(&self, entity: EntityRef) -> Vec<RevisionEntry> {
        self.ledger(entity)
            .map(|ledger| {
                ledger
                    .iter()
                    .map(|stored| RevisionEntry {
                        record: stored.record.clone(),
                        graph: Some(stored.graph.clone()),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Paged, sortable query over revision metadata, with optional eager
    /// materialization per page entry.
    pub fn page(&self, entity: EntityRef, query: &RevisionQuery) -> Vec<RevisionEntry> {
        let Some(ledger) = self.ledger(entity) else {
            return Vec::new();
        };
        let mut rows: Vec<&Arc<StoredRevision>> = ledger.iter().collect();

        if let Some((field, order)) = query.sort {
            rows.sort_by(|a, b| {
                let ordering = match field {
                    SortField::Number => a.record.number.cmp(&b.record.number),
                    SortField::Timestamp => a.record.timestamp.cmp(&b.record.timestamp),
                    SortField::Author => a.record.author.cmp(&b.record.author),
                    SortField::Kind => {
                        sort_rank(a.record.kind).cmp(&sort_rank(b.record.kind))
                    }
                };
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        rows.into_iter()
            .skip(query.first)
            .take(query.page_size)
            .map(|stored| RevisionEntry {
                record: stored.record.clone(),
                graph: query.with_graph.then(|| stored.graph.clone()),
            })
            .collect()
    }

    /// Final state of a hard-deleted entity, if it was ever deleted.
    pub fn last_deleted(&self, entity: EntityRef) -> Option<ContentGraph> {
        self.ledger(entity)?
            .iter()
            .rev()
            .find(|stored| stored.record.kind.is_deletion())
            .map(|stored| stored.graph.clone())
    }
}

fn sort_rank(kind: RevisionKind) -> u8 {
    match kind {
        RevisionKind::Add => 0,
        RevisionKind::Mod => 1,
        RevisionKind::Del => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::course::Course;
    use crate::content::exercise::Exercise;
    use crate::content::version::CourseContent;

    fn course_with_id(id: u64, name: &str) -> Course {
        let mut course = Course::new(name);
        course.meta_mut().assign_storage_id(EntityId::new(id));
        course
    }

    fn exercise_with_id(id: u64, name: &str) -> Exercise {
        let mut exercise = Exercise::new(name);
        exercise.meta_mut().assign_storage_id(EntityId::new(id));
        exercise
    }

    #[test]
    fn test_interleaved_commits_leave_gaps() {
        let mut log = RevisionLog::new();
        let course = EntityRef::course(EntityId::new(1));

        log.append_if_changed(ContentGraph::Course(course_with_id(1, "C")), None)
            .unwrap();
        log.append_if_changed(ContentGraph::Exercise(exercise_with_id(2, "E")), None)
            .unwrap();
        log.append_if_changed(ContentGraph::Course(course_with_id(1, "C2")), None)
            .unwrap();

        let numbers = log.numbers_for(course);
        assert_eq!(numbers.len(), 2);
        assert!(numbers[0] < numbers[1]);
        // the exercise commit in between claimed a number
        assert!(numbers[1].raw() - numbers[0].raw() > 1);
    }

    #[test]
    fn test_unchanged_graph_records_nothing() {
        let mut log = RevisionLog::new();
        log.append_if_changed(ContentGraph::Course(course_with_id(1, "C")), None)
            .unwrap();
        let second = log
            .append_if_changed(ContentGraph::Course(course_with_id(1, "C")), None)
            .unwrap();
        assert!(second.is_none());
    }

    #[test]
    fn test_latest_of_unknown_entity_is_sentinel() {
        let log = RevisionLog::new();
        let number = log.latest(EntityRef::course(EntityId::new(99)));
        assert!(number.is_unpersisted());
    }

    #[test]
    fn test_materialize_unknown_revision_fails() {
        let mut log = RevisionLog::new();
        log.append_if_changed(ContentGraph::Course(course_with_id(1, "C")), None)
            .unwrap();
        let err = log
            .materialize_course(EntityId::new(1), RevisionNumber::new(9999))
            .unwrap_err();
        assert!(matches!(err, RevisionError::UnknownRevision { .. }));
    }

    #[test]
    fn test_materialized_graph_is_tagged_with_revision() {
        let mut log = RevisionLog::new();
        let number = log
            .append_if_changed(ContentGraph::Course(course_with_id(1, "C")), None)
            .unwrap()
            .unwrap();
        let historical = log.materialize_course(EntityId::new(1), number).unwrap();
        assert_eq!(historical.revision(), number);
        assert_eq!(historical.content().name(), "C");
    }
}
