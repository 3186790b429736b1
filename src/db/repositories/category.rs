//! Category repository
//!
//! Database operations for categories.
//!
//! This module provides:
//! - `CategoryRepository` trait defining the interface for category data access
//! - `SqlxCategoryRepository` implementing the trait for SQLite, MySQL and PostgreSQL
//!
//! A write that hits the unique slug index fails with
//! [`RepositoryError::UniqueViolation`](crate::db::RepositoryError).

use crate::db::error::write_error;
use crate::db::{Backend, DynDatabasePool};
use crate::models::Category;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, PgPool, Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List all categories in insertion order
    async fn list(&self) -> Result<Vec<Category>>;

    /// Update a category
    async fn update(&self, category: &Category) -> Result<Category>;

    /// Delete a category. Posts filed under it are deleted with it.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a category slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based category repository implementation
///
/// Supports SQLite, MySQL and PostgreSQL databases.
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_category_sqlite(pool, category).await,
            Backend::Mysql(pool) => create_category_mysql(pool, category).await,
            Backend::Postgres(pool) => create_category_postgres(pool, category).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_category_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_category_by_id_mysql(pool, id).await,
            Backend::Postgres(pool) => get_category_by_id_postgres(pool, id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_category_by_slug_sqlite(pool, slug).await,
            Backend::Mysql(pool) => get_category_by_slug_mysql(pool, slug).await,
            Backend::Postgres(pool) => get_category_by_slug_postgres(pool, slug).await,
        }
    }

    async fn list(&self) -> Result<Vec<Category>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_categories_sqlite(pool).await,
            Backend::Mysql(pool) => list_categories_mysql(pool).await,
            Backend::Postgres(pool) => list_categories_postgres(pool).await,
        }
    }

    async fn update(&self, category: &Category) -> Result<Category> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => update_category_sqlite(pool, category).await,
            Backend::Mysql(pool) => update_category_mysql(pool, category).await,
            Backend::Postgres(pool) => update_category_postgres(pool, category).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => delete_category_sqlite(pool, id).await,
            Backend::Mysql(pool) => delete_category_mysql(pool, id).await,
            Backend::Postgres(pool) => delete_category_postgres(pool, id).await,
        }
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => exists_by_slug_sqlite(pool, slug).await,
            Backend::Mysql(pool) => exists_by_slug_mysql(pool, slug).await,
            Backend::Postgres(pool) => exists_by_slug_postgres(pool, slug).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Category> {
    let result = sqlx::query("INSERT INTO categories (name, slug) VALUES (?, ?)")
        .bind(&category.name)
        .bind(&category.slug)
        .execute(pool)
        .await
        .map_err(|e| write_error(e, "Failed to create category"))?;

    Ok(Category {
        id: result.last_insert_rowid(),
        name: category.name.clone(),
        slug: category.slug.clone(),
    })
}

async fn get_category_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT id, name, slug FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by ID")?;

    Ok(row.as_ref().map(row_to_category_sqlite))
}

async fn get_category_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT id, name, slug FROM categories WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by slug")?;

    Ok(row.as_ref().map(row_to_category_sqlite))
}

async fn list_categories_sqlite(pool: &SqlitePool) -> Result<Vec<Category>> {
    let rows = sqlx::query("SELECT id, name, slug FROM categories ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    Ok(rows.iter().map(row_to_category_sqlite).collect())
}

async fn update_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Category> {
    sqlx::query("UPDATE categories SET name = ?, slug = ? WHERE id = ?")
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.id)
        .execute(pool)
        .await
        .map_err(|e| write_error(e, "Failed to update category"))?;

    get_category_by_id_sqlite(pool, category.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Category not found after update"))
}

async fn delete_category_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;

    Ok(())
}

async fn exists_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM categories WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check category slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Category> {
    let result = sqlx::query("INSERT INTO categories (name, slug) VALUES (?, ?)")
        .bind(&category.name)
        .bind(&category.slug)
        .execute(pool)
        .await
        .map_err(|e| write_error(e, "Failed to create category"))?;

    Ok(Category {
        id: result.last_insert_id() as i64,
        name: category.name.clone(),
        slug: category.slug.clone(),
    })
}

async fn get_category_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT id, name, slug FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by ID")?;

    Ok(row.as_ref().map(row_to_category_mysql))
}

async fn get_category_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT id, name, slug FROM categories WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by slug")?;

    Ok(row.as_ref().map(row_to_category_mysql))
}

async fn list_categories_mysql(pool: &MySqlPool) -> Result<Vec<Category>> {
    let rows = sqlx::query("SELECT id, name, slug FROM categories ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    Ok(rows.iter().map(row_to_category_mysql).collect())
}

async fn update_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Category> {
    sqlx::query("UPDATE categories SET name = ?, slug = ? WHERE id = ?")
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.id)
        .execute(pool)
        .await
        .map_err(|e| write_error(e, "Failed to update category"))?;

    get_category_by_id_mysql(pool, category.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Category not found after update"))
}

async fn delete_category_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;

    Ok(())
}

async fn exists_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM categories WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check category slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
    }
}

// ============================================================================
// PostgreSQL implementations
// ============================================================================

async fn create_category_postgres(pool: &PgPool, category: &Category) -> Result<Category> {
    let row = sqlx::query("INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING id")
        .bind(&category.name)
        .bind(&category.slug)
        .fetch_one(pool)
        .await
        .map_err(|e| write_error(e, "Failed to create category"))?;

    Ok(Category {
        id: row.get("id"),
        name: category.name.clone(),
        slug: category.slug.clone(),
    })
}

async fn get_category_by_id_postgres(pool: &PgPool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT id, name, slug FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by ID")?;

    Ok(row.as_ref().map(row_to_category_postgres))
}

async fn get_category_by_slug_postgres(pool: &PgPool, slug: &str) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT id, name, slug FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get category by slug")?;

    Ok(row.as_ref().map(row_to_category_postgres))
}

async fn list_categories_postgres(pool: &PgPool) -> Result<Vec<Category>> {
    let rows = sqlx::query("SELECT id, name, slug FROM categories ORDER BY id")
        .fetch_all(pool)
        .await
        .context("Failed to list categories")?;

    Ok(rows.iter().map(row_to_category_postgres).collect())
}

async fn update_category_postgres(pool: &PgPool, category: &Category) -> Result<Category> {
    sqlx::query("UPDATE categories SET name = $1, slug = $2 WHERE id = $3")
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.id)
        .execute(pool)
        .await
        .map_err(|e| write_error(e, "Failed to update category"))?;

    get_category_by_id_postgres(pool, category.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Category not found after update"))
}

async fn delete_category_postgres(pool: &PgPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;

    Ok(())
}

async fn exists_by_slug_postgres(pool: &PgPool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check category slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_category_postgres(row: &sqlx::postgres::PgRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
    }
}
