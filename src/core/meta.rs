use crate::core::id::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bookkeeping shared by every identity-bearing content type.
///
/// An entity without a storage id is *transient*: it has neither been saved
/// to nor read from the store. The update timestamp is never bumped
/// automatically; callers that want a commit to be recorded regardless of
/// content changes use the explicit revision-recording capability on the
/// transaction instead of writing to this field as a side channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMeta {
    storage_id: Option<EntityId>,
    updated_at: Option<DateTime<Utc>>,
    updated_by: Option<String>,
}

impl EntityMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage id, present once the entity has been merged.
    pub fn storage_id(&self) -> Option<EntityId> {
        self.storage_id
    }

    pub fn is_transient(&self) -> bool {
        self.storage_id.is_none()
    }

    pub(crate) fn assign_storage_id(&mut self, id: EntityId) {
        self.storage_id = Some(id);
    }

    /// Drops the identity so the entity is treated as brand-new content on
    /// the next merge.
    pub(crate) fn mark_transient(&mut self) {
        self.storage_id = None;
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Sets the update timestamp to now.
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    pub fn updated_by(&self) -> Option<&str> {
        self.updated_by.as_deref()
    }

    pub(crate) fn set_updated_by(&mut self, user: impl Into<String>) {
        self.updated_by = Some(user.into());
    }

    /// Bookkeeping state for a deep copy: identity and timestamp are reset,
    /// the last editor is carried over.
    pub fn copied(&self) -> Self {
        Self {
            storage_id: None,
            updated_at: None,
            updated_by: self.updated_by.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_meta_is_transient() {
        let meta = EntityMeta::new();
        assert!(meta.is_transient());
        assert!(meta.storage_id().is_none());
    }

    #[test]
    fn test_assign_and_drop_identity() {
        let mut meta = EntityMeta::new();
        meta.assign_storage_id(EntityId::new(7));
        assert!(!meta.is_transient());

        meta.mark_transient();
        assert!(meta.is_transient());
    }

    #[test]
    fn test_copied_resets_identity_but_keeps_editor() {
        let mut meta = EntityMeta::new();
        meta.assign_storage_id(EntityId::new(7));
        meta.touch();
        meta.set_updated_by("alice");

        let copy = meta.copied();
        assert!(copy.is_transient());
        assert!(copy.updated_at().is_none());
        assert_eq!(copy.updated_by(), Some("alice"));
    }
}
