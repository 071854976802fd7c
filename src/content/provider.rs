// ============================================================================
// Exercise Providers
// ============================================================================
//
// A course does not own its exercises directly; it owns a provider that
// determines which exercises are part of the course. Providers are
// interchangeable children with their own identity: swapping one for
// another changes what the course points at even when no course field
// changes, which is why the provider id takes part in graph comparison.
//
// ============================================================================

use crate::content::catalog::ContentFolder;
use crate::copy::{CopyResult, DeepCopy};
use crate::core::id::EntityId;
use crate::core::meta::EntityMeta;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One entry of a fixed exercise list: which exercise, how many points, at
/// which position, and optionally which frozen snapshot of it is pinned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseEntry {
    pub exercise_id: EntityId,
    pub frozen_exercise_id: Option<EntityId>,
    pub points: u32,
    pub order: u32,
}

impl CourseEntry {
    pub fn new(exercise_id: EntityId, points: u32, order: u32) -> Self {
        Self {
            exercise_id,
            frozen_exercise_id: None,
            points,
            order,
        }
    }
}

/// The two ways a provider can select exercises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// An explicit, ordered list of exercises.
    FixedList { entries: Vec<CourseEntry> },
    /// Every exercise below the referenced folders.
    Folder { folders: Vec<Arc<ContentFolder>> },
}

/// Identity-bearing provider object owned by a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProvider {
    meta: EntityMeta,
    kind: ProviderKind,
}

impl ExerciseProvider {
    pub fn fixed_list(entries: Vec<CourseEntry>) -> Self {
        Self {
            meta: EntityMeta::new(),
            kind: ProviderKind::FixedList { entries },
        }
    }

    pub fn folder(folders: Vec<Arc<ContentFolder>>) -> Self {
        Self {
            meta: EntityMeta::new(),
            kind: ProviderKind::Folder { folders },
        }
    }

    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    pub(crate) fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    pub fn kind(&self) -> &ProviderKind {
        &self.kind
    }

    pub fn is_fixed_list(&self) -> bool {
        matches!(self.kind, ProviderKind::FixedList { .. })
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ProviderKind::Folder { .. })
    }

    /// Entries of a fixed list, `None` for folder providers.
    pub fn entries(&self) -> Option<&[CourseEntry]> {
        match &self.kind {
            ProviderKind::FixedList { entries } => Some(entries),
            ProviderKind::Folder { .. } => None,
        }
    }

    pub fn add_entry(&mut self, entry: CourseEntry) -> bool {
        match &mut self.kind {
            ProviderKind::FixedList { entries } => {
                entries.push(entry);
                true
            }
            ProviderKind::Folder { .. } => false,
        }
    }
}

impl DeepCopy for ExerciseProvider {
    fn deep_copy(&self) -> CopyResult<Self> {
        let kind = match &self.kind {
            ProviderKind::FixedList { entries } => ProviderKind::FixedList {
                entries: entries.clone(),
            },
            // folders are catalog data, shared by reference
            ProviderKind::Folder { folders } => ProviderKind::Folder {
                folders: folders.clone(),
            },
        };
        Ok(Self {
            meta: self.meta.copied(),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_list_entries() {
        let mut provider = ExerciseProvider::fixed_list(vec![CourseEntry::new(
            EntityId::new(4),
            10,
            0,
        )]);
        assert!(provider.is_fixed_list());
        assert!(provider.add_entry(CourseEntry::new(EntityId::new(5), 20, 1)));
        assert_eq!(provider.entries().unwrap().len(), 2);
    }

    #[test]
    fn test_folder_provider_has_no_entries() {
        let mut provider = ExerciseProvider::folder(vec![Arc::new(ContentFolder::new("algebra"))]);
        assert!(provider.entries().is_none());
        assert!(!provider.add_entry(CourseEntry::new(EntityId::new(4), 10, 0)));
    }

    #[test]
    fn test_copy_shares_folders_and_resets_identity() {
        let folder = Arc::new(ContentFolder::new("algebra"));
        let mut provider = ExerciseProvider::folder(vec![folder.clone()]);
        provider.meta_mut().assign_storage_id(EntityId::new(9));

        let copy = provider.deep_copy().unwrap();
        assert!(copy.meta().is_transient());
        match copy.kind() {
            ProviderKind::Folder { folders } => assert!(Arc::ptr_eq(&folders[0], &folder)),
            _ => panic!("expected folder provider"),
        }
    }
}
