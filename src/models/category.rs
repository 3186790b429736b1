//! Category model

use serde::{Deserialize, Serialize};

/// A named bucket posts can be filed under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// URL-friendly slug, unique across categories
    pub slug: String,
}

impl Category {
    /// Create a category that has not been stored yet.
    ///
    /// The ID is 0 until the database assigns one.
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            slug: slug.into(),
        }
    }
}

/// Input for creating a category. A missing slug is derived from the name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl CreateCategoryInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
        }
    }

    /// Use an explicit slug instead of deriving one
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

/// Input for updating a category. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub slug: Option<String>,
}

impl UpdateCategoryInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.slug.is_some()
    }
}
