//! Shared API response types

use serde::{Deserialize, Serialize};

use crate::models::{Category, Post};

/// Category as returned by the API, also embedded in posts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
        }
    }
}

/// Post as returned by the API.
///
/// The category is embedded rather than referenced by ID; writes use
/// `category_id` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub category: Option<CategoryResponse>,
    pub title: String,
    pub slug: String,
    pub image: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    /// RFC 3339
    pub created_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            category: post.category.map(Into::into),
            title: post.title,
            slug: post.slug,
            image: post.image,
            excerpt: post.excerpt,
            content: post.content,
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

/// Links to the API's collections
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiRootResponse {
    pub posts: String,
    pub categories: String,
}
