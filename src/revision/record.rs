// ============================================================================
// Revision Records
// ============================================================================

use crate::content::course::Course;
use crate::content::exercise::Exercise;
use crate::content::version::{CourseContent, ExerciseContent};
use crate::core::id::{EntityKind, EntityRef, RevisionNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a revision did to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevisionKind {
    /// First committed state.
    Add,
    /// A content-changing merge.
    Mod,
    /// Hard deletion; the record keeps the final state.
    Del,
}

impl RevisionKind {
    pub fn is_deletion(&self) -> bool {
        matches!(self, RevisionKind::Del)
    }
}

/// Metadata of one committed revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionRecord {
    pub entity: EntityRef,
    pub number: RevisionNumber,
    pub kind: RevisionKind,
    pub timestamp: DateTime<Utc>,
    pub author: Option<String>,
}

/// A full aggregate graph as stored in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentGraph {
    Course(Course),
    Exercise(Exercise),
}

impl ContentGraph {
    pub fn kind(&self) -> EntityKind {
        match self {
            ContentGraph::Course(_) => EntityKind::Course,
            ContentGraph::Exercise(_) => EntityKind::Exercise,
        }
    }

    /// Address of the graph's entity, `None` while it is transient.
    pub fn entity_ref(&self) -> Option<EntityRef> {
        match self {
            ContentGraph::Course(c) => c.entity_ref(),
            ContentGraph::Exercise(e) => e.entity_ref(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ContentGraph::Course(c) => c.name(),
            ContentGraph::Exercise(e) => e.name(),
        }
    }

    pub fn as_course(&self) -> Option<&Course> {
        match self {
            ContentGraph::Course(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_exercise(&self) -> Option<&Exercise> {
        match self {
            ContentGraph::Exercise(e) => Some(e),
            _ => None,
        }
    }
}

/// One row of a revision history query: metadata plus, when requested, the
/// eagerly materialized graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionEntry {
    pub record: RevisionRecord,
    pub graph: Option<ContentGraph>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Number,
    Timestamp,
    Author,
    Kind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Paging and sorting for revision history tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionQuery {
    pub first: usize,
    pub page_size: usize,
    pub sort: Option<(SortField, SortOrder)>,
    pub with_graph: bool,
}

impl RevisionQuery {
    pub fn page(first: usize, page_size: usize) -> Self {
        Self {
            first,
            page_size,
            sort: None,
            with_graph: false,
        }
    }

    pub fn sorted_by(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort = Some((field, order));
        self
    }

    /// Eagerly materialize the graph for every returned row. This can be
    /// slow for large pages.
    pub fn with_graph(mut self) -> Self {
        self.with_graph = true;
        self
    }
}
