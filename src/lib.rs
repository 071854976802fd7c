// ============================================================================
// RevStore Library
// ============================================================================

//! In-memory content store with append-only revision history, immutable
//! frozen snapshots and time travel.
//!
//! Lecturers keep editing courses and exercises while attempts, submissions
//! and published offerings stay pinned to the exact historical state they
//! were assigned:
//!
//! - every content-changing commit appends to a per-entity revision log;
//! - a snapshot freezer materializes one revision into an independent,
//!   immutable frozen copy with its own identity;
//! - a revision navigator restores live content to a prior state, repairing
//!   references that have since become dangling;
//! - a deep-copy contract guarantees snapshots and resets never alias
//!   mutable state.
//!
//! # Examples
//!
//! ```
//! use revstore::{ContentStore, RevisionNavigator, SnapshotFreezer};
//! use revstore::content::{Course, CourseContent};
//!
//! # fn main() -> revstore::Result<()> {
//! let store = ContentStore::new();
//! let freezer = SnapshotFreezer::new();
//! let navigator = RevisionNavigator::new();
//!
//! // Commit a course, then rename it.
//! let course = store.transaction(|tx| {
//!     tx.set_author("alice");
//!     tx.merge_course(Course::new("Analysis I"))
//! })?;
//! let id = course.id().expect("merged course has an id");
//! let entity = course.entity_ref().expect("merged course is addressable");
//!
//! let mut renamed = course.clone();
//! renamed.set_name("Analysis I (revised)");
//! store.transaction(|tx| tx.merge_course(renamed))?;
//!
//! // Freeze the first revision; it keeps the old name forever.
//! let frozen = store.transaction(|tx| {
//!     let first = tx.log().numbers_for(entity)[0];
//!     freezer.freeze_course(tx, id, first)
//! })?;
//! assert_eq!(frozen.name(), "Analysis I");
//!
//! // Time travel: reset the live course to the first revision.
//! let restored = store.transaction(|tx| {
//!     let first = tx.log().numbers_for(entity)[0];
//!     let reset = navigator.reset_course(tx, id, first)?;
//!     tx.merge_course(reset)
//! })?;
//! assert_eq!(restored.name(), "Analysis I");
//! # Ok(())
//! # }
//! ```

pub mod content;
pub mod copy;
pub mod core;
pub mod revision;
pub mod storage;

// Re-export main types for convenience
pub use core::{EntityId, EntityKind, EntityRef, Result, RevisionError, RevisionNumber, StageId};
pub use copy::{CopyError, CopyResult, DeepCopy};
pub use revision::{
    ContentGraph, RevisionEntry, RevisionKind, RevisionLog, RevisionNavigator, RevisionQuery,
    RevisionRecord, SnapshotFreezer, SortField, SortOrder,
};
pub use storage::{ContentStore, StoreTransaction};
