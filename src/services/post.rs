//! Post service
//!
//! Business rules for posts:
//! - Title, slug, content and image validation
//! - Slug generation from the title
//! - Slug uniqueness
//! - Category existence on write
//! - Filtered listing through [`PostQuery`]

use crate::db::is_unique_violation;
use crate::db::repositories::{CategoryRepository, PostRepository};
use crate::models::{CreatePostInput, Post, UpdatePostInput};
use crate::services::post_query::PostQuery;
use crate::services::slug::{generate_slug, validate_slug};
use anyhow::Context;
use std::sync::Arc;

/// Longest post title accepted
pub const MAX_TITLE_LENGTH: usize = 200;

/// Longest stored image path accepted
pub const MAX_IMAGE_LENGTH: usize = 255;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post not found
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate slug
    #[error("Post slug already exists: {0}")]
    DuplicateSlug(String),

    /// Referenced category does not exist
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service for managing blog posts
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl PostService {
    /// Create a new post service
    pub fn new(repo: Arc<dyn PostRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { repo, categories }
    }

    /// List posts matching `query`, newest first
    pub async fn list(&self, query: &PostQuery) -> Result<Vec<Post>, PostServiceError> {
        let posts = self.repo.list().await.context("Failed to list posts")?;
        let matched = query.apply(&posts).to_vec();

        tracing::debug!(
            category = ?query.category(),
            search = ?query.search(),
            "Listed {} of {} posts",
            matched.len(),
            posts.len()
        );
        Ok(matched)
    }

    /// Get post by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>, PostServiceError> {
        Ok(self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post by slug")?)
    }

    /// Create a new post
    ///
    /// An empty slug is generated from the title.
    ///
    /// # Errors
    /// - `ValidationError` for a bad title, slug, content or image
    /// - `CategoryNotFound` if `category_id` names no category
    /// - `DuplicateSlug` if the slug is taken
    pub async fn create(&self, mut input: CreatePostInput) -> Result<Post, PostServiceError> {
        validate_title(&input.title)?;
        validate_content(&input.content)?;
        validate_image(input.image.as_deref())?;

        if input.slug.trim().is_empty() {
            input.slug = generate_slug(&input.title);
        }
        validate_slug(&input.slug).map_err(PostServiceError::ValidationError)?;

        if let Some(category_id) = input.category_id {
            self.ensure_category(category_id).await?;
        }

        if self
            .repo
            .exists_by_slug(&input.slug)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Err(PostServiceError::DuplicateSlug(input.slug));
        }

        let post = match self.repo.create(&input).await {
            Ok(post) => post,
            // Another request took the slug after the check above
            Err(e) if is_unique_violation(&e) => {
                return Err(PostServiceError::DuplicateSlug(input.slug))
            }
            Err(e) => return Err(e.context("Failed to create post").into()),
        };

        tracing::info!("Created post {} ({})", post.slug, post.id);
        Ok(post)
    }

    /// Update the post identified by `slug`
    ///
    /// Only fields set on `input` change. `created_at` never does.
    pub async fn update(
        &self,
        slug: &str,
        input: UpdatePostInput,
    ) -> Result<Post, PostServiceError> {
        let existing = self
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| PostServiceError::NotFound(slug.to_string()))?;

        if let Some(ref title) = input.title {
            validate_title(title)?;
        }
        if let Some(ref content) = input.content {
            validate_content(content)?;
        }
        if let Some(ref image) = input.image {
            validate_image(image.as_deref())?;
        }
        if let Some(ref new_slug) = input.slug {
            validate_slug(new_slug).map_err(PostServiceError::ValidationError)?;
        }
        if let Some(Some(category_id)) = input.category_id {
            self.ensure_category(category_id).await?;
        }

        if let Some(ref new_slug) = input.slug {
            if new_slug != &existing.slug
                && self
                    .repo
                    .exists_by_slug(new_slug)
                    .await
                    .context("Failed to check slug uniqueness")?
            {
                return Err(PostServiceError::DuplicateSlug(new_slug.clone()));
            }
        }

        if !input.has_changes() {
            return Ok(existing);
        }

        let post = match self.repo.update(existing.id, &input).await {
            Ok(post) => post,
            Err(e) if is_unique_violation(&e) => {
                let slug = input.slug.unwrap_or(existing.slug);
                return Err(PostServiceError::DuplicateSlug(slug));
            }
            Err(e) => return Err(e.context("Failed to update post").into()),
        };

        tracing::info!("Updated post {} ({})", post.slug, post.id);
        Ok(post)
    }

    /// Delete the post identified by `slug`
    pub async fn delete(&self, slug: &str) -> Result<(), PostServiceError> {
        let post = self
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| PostServiceError::NotFound(slug.to_string()))?;

        self.repo
            .delete(post.id)
            .await
            .context("Failed to delete post")?;

        tracing::info!("Deleted post {} ({})", post.slug, post.id);
        Ok(())
    }

    async fn ensure_category(&self, category_id: i64) -> Result<(), PostServiceError> {
        let exists = self
            .categories
            .get_by_id(category_id)
            .await
            .context("Failed to look up category")?
            .is_some();

        if exists {
            Ok(())
        } else {
            Err(PostServiceError::CategoryNotFound(category_id))
        }
    }
}

fn validate_title(title: &str) -> Result<(), PostServiceError> {
    if title.trim().is_empty() {
        return Err(PostServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(PostServiceError::ValidationError(format!(
            "Title cannot exceed {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), PostServiceError> {
    if content.trim().is_empty() {
        return Err(PostServiceError::ValidationError(
            "Content cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_image(image: Option<&str>) -> Result<(), PostServiceError> {
    match image {
        Some(path) if path.chars().count() > MAX_IMAGE_LENGTH => {
            Err(PostServiceError::ValidationError(format!(
                "Image path cannot exceed {} characters",
                MAX_IMAGE_LENGTH
            )))
        }
        _ => Ok(()),
    }
}
