//! Post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Category;

/// A blog post, with its category resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Category the post is filed under, if any
    pub category: Option<Category>,
    /// Post title
    pub title: String,
    /// URL-friendly slug, the external lookup key
    pub slug: String,
    /// Media URL of the header image
    pub image: Option<String>,
    /// Short summary shown in listings
    pub excerpt: Option<String>,
    /// HTML body
    pub content: String,
    /// Set once on insert
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Slug of the post's category, if it has one
    pub fn category_slug(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.slug.as_str())
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().map(|c| c.id)
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    pub category_id: Option<i64>,
    pub title: String,
    pub slug: String,
    pub image: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
}

impl CreatePostInput {
    /// Create an input with the required fields set
    ///
    /// An empty slug is derived from the title when the post is created.
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            category_id: None,
            title: title.into(),
            slug: slug.into(),
            image: None,
            excerpt: None,
            content: content.into(),
        }
    }

    /// Set the category ID
    pub fn with_category_id(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Set the excerpt
    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    /// Set the image URL
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Input for updating an existing post.
///
/// The outer `Option` says whether a field is being changed. For nullable
/// columns the inner `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    pub category_id: Option<Option<i64>>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub image: Option<Option<String>>,
    pub excerpt: Option<Option<String>>,
    pub content: Option<String>,
}

impl UpdatePostInput {
    /// Create a new empty UpdatePostInput
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the slug
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Set the content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set or clear the category
    pub fn with_category_id(mut self, category_id: Option<i64>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Set or clear the excerpt
    pub fn with_excerpt(mut self, excerpt: Option<String>) -> Self {
        self.excerpt = Some(excerpt);
        self
    }

    /// Set or clear the image
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = Some(image);
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.category_id.is_some()
            || self.title.is_some()
            || self.slug.is_some()
            || self.image.is_some()
            || self.excerpt.is_some()
            || self.content.is_some()
    }
}
