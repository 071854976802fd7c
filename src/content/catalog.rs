// ============================================================================
// Catalog Types
// ============================================================================
//
// Shared identity data maintained outside the content subsystem: tags,
// users, folders and subjects. Content aggregates reference these behind an
// Arc and never deep-copy them; original and copy share the allocation.
//
// ============================================================================

use serde::{Deserialize, Serialize};

/// A tag attached to exercises. Tags are uniquely named in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A user of the platform, referenced as author/editor of content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    login_name: String,
}

impl User {
    pub fn new(login_name: impl Into<String>) -> Self {
        Self {
            login_name: login_name.into(),
        }
    }

    pub fn login_name(&self) -> &str {
        &self.login_name
    }
}

/// A folder in the content tree. Folder management itself is external.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentFolder {
    name: String,
}

impl ContentFolder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The subject a course belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    name: String,
}

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
