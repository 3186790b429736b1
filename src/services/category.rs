//! Category service
//!
//! Business rules for categories:
//! - Name and slug validation
//! - Slug generation from the name
//! - Slug uniqueness
//!
//! Deleting a category removes its posts through the foreign key cascade.

use crate::db::is_unique_violation;
use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};
use crate::services::slug::{generate_slug, validate_slug};
use anyhow::Context;
use std::sync::Arc;

/// Longest category name accepted
pub const MAX_NAME_LENGTH: usize = 100;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category slug already exists
    #[error("Category slug already exists: {0}")]
    DuplicateSlug(String),

    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service for managing blog categories
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Create a new category
    ///
    /// # Errors
    /// - `ValidationError` for a blank or oversized name, or a bad slug
    /// - `DuplicateSlug` if a category with the same slug already exists
    pub async fn create(&self, input: CreateCategoryInput) -> Result<Category, CategoryServiceError> {
        validate_name(&input.name)?;

        let slug = match input.slug {
            Some(slug) if !slug.trim().is_empty() => slug,
            _ => generate_slug(&input.name),
        };
        validate_slug(&slug).map_err(CategoryServiceError::ValidationError)?;

        if self
            .repo
            .exists_by_slug(&slug)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Err(CategoryServiceError::DuplicateSlug(slug));
        }

        let created = match self.repo.create(&Category::new(input.name, slug.clone())).await {
            Ok(category) => category,
            // Another request took the slug after the check above
            Err(e) if is_unique_violation(&e) => {
                return Err(CategoryServiceError::DuplicateSlug(slug))
            }
            Err(e) => return Err(e.context("Failed to create category").into()),
        };

        tracing::info!("Created category {} ({})", created.slug, created.id);
        Ok(created)
    }

    /// Get category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, CategoryServiceError> {
        Ok(self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get category by slug")?)
    }

    /// List all categories
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.repo.list().await.context("Failed to list categories")?)
    }

    /// Update the category identified by `slug`
    ///
    /// # Errors
    /// - `NotFound` if the category doesn't exist
    /// - `ValidationError` for an invalid new name or slug
    /// - `DuplicateSlug` if the new slug belongs to another category
    pub async fn update(
        &self,
        slug: &str,
        input: UpdateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let mut category = self.require(slug).await?;

        if let Some(name) = input.name {
            validate_name(&name)?;
            category.name = name;
        }

        if let Some(new_slug) = input.slug {
            validate_slug(&new_slug).map_err(CategoryServiceError::ValidationError)?;
            if new_slug != category.slug {
                if self
                    .repo
                    .exists_by_slug(&new_slug)
                    .await
                    .context("Failed to check slug uniqueness")?
                {
                    return Err(CategoryServiceError::DuplicateSlug(new_slug));
                }
                category.slug = new_slug;
            }
        }

        let updated = match self.repo.update(&category).await {
            Ok(category) => category,
            Err(e) if is_unique_violation(&e) => {
                return Err(CategoryServiceError::DuplicateSlug(category.slug))
            }
            Err(e) => return Err(e.context("Failed to update category").into()),
        };

        tracing::info!("Updated category {} ({})", updated.slug, updated.id);
        Ok(updated)
    }

    /// Delete the category identified by `slug`, along with its posts
    pub async fn delete(&self, slug: &str) -> Result<(), CategoryServiceError> {
        let category = self.require(slug).await?;

        self.repo
            .delete(category.id)
            .await
            .context("Failed to delete category")?;

        tracing::info!("Deleted category {} ({})", category.slug, category.id);
        Ok(())
    }

    async fn require(&self, slug: &str) -> Result<Category, CategoryServiceError> {
        self.get_by_slug(slug)
            .await?
            .ok_or_else(|| CategoryServiceError::NotFound(slug.to_string()))
    }
}

fn validate_name(name: &str) -> Result<(), CategoryServiceError> {
    if name.trim().is_empty() {
        return Err(CategoryServiceError::ValidationError(
            "Category name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CategoryServiceError::ValidationError(format!(
            "Category name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}
