// ============================================================================
// Attached Resources
// ============================================================================

use crate::content::catalog::User;
use crate::copy::{CopyResult, DeepCopy};
use crate::core::meta::EntityMeta;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A file attached to a course.
///
/// Resources carry their own identity because history-backed instances must
/// be replaced by fresh copies before they can be reattached to a live
/// aggregate (see the navigator's resource repair).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseResource {
    meta: EntityMeta,
    filename: String,
    content: Vec<u8>,
    description: Option<String>,
    last_editor: Option<Arc<User>>,
}

impl CourseResource {
    pub fn new(filename: impl Into<String>, content: Vec<u8>, last_editor: Option<Arc<User>>) -> Self {
        Self {
            meta: EntityMeta::new(),
            filename: filename.into(),
            content,
            description: None,
            last_editor,
        }
    }

    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    pub(crate) fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn last_editor(&self) -> Option<&Arc<User>> {
        self.last_editor.as_ref()
    }
}

impl DeepCopy for CourseResource {
    fn deep_copy(&self) -> CopyResult<Self> {
        Ok(Self {
            meta: self.meta.copied(),
            filename: self.filename.clone(),
            content: self.content.clone(),
            description: self.description.clone(),
            // editors are catalog data, shared by reference
            last_editor: self.last_editor.clone(),
        })
    }
}

/// A file attached to an exercise (images, data sets, checker inputs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseResource {
    meta: EntityMeta,
    filename: String,
    content: Vec<u8>,
    description: Option<String>,
    last_editor: Option<Arc<User>>,
}

impl ExerciseResource {
    pub fn new(filename: impl Into<String>, content: Vec<u8>, last_editor: Option<Arc<User>>) -> Self {
        Self {
            meta: EntityMeta::new(),
            filename: filename.into(),
            content,
            description: None,
            last_editor,
        }
    }

    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    pub(crate) fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn last_editor(&self) -> Option<&Arc<User>> {
        self.last_editor.as_ref()
    }
}

impl DeepCopy for ExerciseResource {
    fn deep_copy(&self) -> CopyResult<Self> {
        Ok(Self {
            meta: self.meta.copied(),
            filename: self.filename.clone(),
            content: self.content.clone(),
            description: self.description.clone(),
            last_editor: self.last_editor.clone(),
        })
    }
}
