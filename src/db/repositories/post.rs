//! Post repository
//!
//! Database operations for posts. Every read joins the post's category so
//! callers always get a fully resolved [`Post`]. A write that hits the unique
//! slug index fails with [`RepositoryError::UniqueViolation`](crate::db::RepositoryError).

use crate::db::error::write_error;
use crate::db::{Backend, DynDatabasePool};
use crate::models::{Category, CreatePostInput, Post, UpdatePostInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, PgPool, Row, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post. `created_at` is set to now.
    async fn create(&self, input: &CreatePostInput) -> Result<Post>;

    /// Get post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// List every post, newest first
    async fn list(&self) -> Result<Vec<Post>>;

    /// Apply the set fields of `input` to the post with this ID
    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Post>;

    /// Delete a post
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a post slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput) -> Result<Post> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => create_post_sqlite(pool, input).await,
            Backend::Mysql(pool) => create_post_mysql(pool, input).await,
            Backend::Postgres(pool) => create_post_postgres(pool, input).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_post_by_slug_sqlite(pool, slug).await,
            Backend::Mysql(pool) => get_post_by_slug_mysql(pool, slug).await,
            Backend::Postgres(pool) => get_post_by_slug_postgres(pool, slug).await,
        }
    }

    async fn list(&self) -> Result<Vec<Post>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_posts_sqlite(pool).await,
            Backend::Mysql(pool) => list_posts_mysql(pool).await,
            Backend::Postgres(pool) => list_posts_postgres(pool).await,
        }
    }

    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Post> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => update_post_sqlite(pool, id, input).await,
            Backend::Mysql(pool) => update_post_mysql(pool, id, input).await,
            Backend::Postgres(pool) => update_post_postgres(pool, id, input).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => delete_post_sqlite(pool, id).await,
            Backend::Mysql(pool) => delete_post_mysql(pool, id).await,
            Backend::Postgres(pool) => delete_post_postgres(pool, id).await,
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

const SELECT_POST: &str = r#"
    SELECT p.id AS id, p.category_id AS category_id, p.title AS title, p.slug AS slug,
           p.image AS image, p.excerpt AS excerpt, p.content AS content,
           p.created_at AS created_at,
           c.name AS category_name, c.slug AS category_slug
    FROM posts p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

/// Field values after merging an update over the stored post
struct MergedPost {
    category_id: Option<i64>,
    title: String,
    slug: String,
    image: Option<String>,
    excerpt: Option<String>,
    content: String,
}

impl MergedPost {
    fn new(existing: Post, input: &UpdatePostInput) -> Self {
        Self {
            category_id: input.category_id.unwrap_or(existing.category_id()),
            title: input.title.clone().unwrap_or(existing.title),
            slug: input.slug.clone().unwrap_or(existing.slug),
            image: input.image.clone().unwrap_or(existing.image),
            excerpt: input.excerpt.clone().unwrap_or(existing.excerpt),
            content: input.content.clone().unwrap_or(existing.content),
        }
    }
}

fn category_from_parts(id: Option<i64>, name: Option<String>, slug: Option<String>) -> Option<Category> {
    match (id, name, slug) {
        (Some(id), Some(name), Some(slug)) => Some(Category { id, name, slug }),
        _ => None,
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, input: &CreatePostInput) -> Result<Post> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO posts (category_id, title, slug, image, excerpt, content, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.category_id)
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.image)
    .bind(&input.excerpt)
    .bind(&input.content)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| write_error(e, "Failed to create post"))?;

    get_post_by_id_sqlite(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after insert"))
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("{} WHERE p.id = ?", SELECT_POST))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    Ok(row.as_ref().map(row_to_post_sqlite))
}

async fn get_post_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("{} WHERE p.slug = ?", SELECT_POST))
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by slug")?;

    Ok(row.as_ref().map(row_to_post_sqlite))
}

async fn list_posts_sqlite(pool: &SqlitePool) -> Result<Vec<Post>> {
    let rows = sqlx::query(&format!("{} ORDER BY p.created_at DESC, p.id DESC", SELECT_POST))
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    Ok(rows.iter().map(row_to_post_sqlite).collect())
}

async fn update_post_sqlite(pool: &SqlitePool, id: i64, input: &UpdatePostInput) -> Result<Post> {
    let existing = get_post_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found"))?;
    let merged = MergedPost::new(existing, input);

    sqlx::query(
        r#"
        UPDATE posts
        SET category_id = ?, title = ?, slug = ?, image = ?, excerpt = ?, content = ?
        WHERE id = ?
        "#,
    )
    .bind(merged.category_id)
    .bind(&merged.title)
    .bind(&merged.slug)
    .bind(&merged.image)
    .bind(&merged.excerpt)
    .bind(&merged.content)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| write_error(e, "Failed to update post"))?;

    get_post_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
}

async fn delete_post_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(())
}

async fn exists_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check post slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        category: category_from_parts(
            row.get("category_id"),
            row.get("category_name"),
            row.get("category_slug"),
        ),
        title: row.get("title"),
        slug: row.get("slug"),
        image: row.get("image"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, input: &CreatePostInput) -> Result<Post> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO posts (category_id, title, slug, image, excerpt, content, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.category_id)
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.image)
    .bind(&input.excerpt)
    .bind(&input.content)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| write_error(e, "Failed to create post"))?;

    get_post_by_id_mysql(pool, result.last_insert_id() as i64)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after insert"))
}

async fn get_post_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("{} WHERE p.id = ?", SELECT_POST))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    Ok(row.as_ref().map(row_to_post_mysql))
}

async fn get_post_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("{} WHERE p.slug = ?", SELECT_POST))
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by slug")?;

    Ok(row.as_ref().map(row_to_post_mysql))
}

async fn list_posts_mysql(pool: &MySqlPool) -> Result<Vec<Post>> {
    let rows = sqlx::query(&format!("{} ORDER BY p.created_at DESC, p.id DESC", SELECT_POST))
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    Ok(rows.iter().map(row_to_post_mysql).collect())
}

async fn update_post_mysql(pool: &MySqlPool, id: i64, input: &UpdatePostInput) -> Result<Post> {
    let existing = get_post_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found"))?;
    let merged = MergedPost::new(existing, input);

    sqlx::query(
        r#"
        UPDATE posts
        SET category_id = ?, title = ?, slug = ?, image = ?, excerpt = ?, content = ?
        WHERE id = ?
        "#,
    )
    .bind(merged.category_id)
    .bind(&merged.title)
    .bind(&merged.slug)
    .bind(&merged.image)
    .bind(&merged.excerpt)
    .bind(&merged.content)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| write_error(e, "Failed to update post"))?;

    get_post_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
}

async fn delete_post_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(())
}

async fn exists_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check post slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Post {
    Post {
        id: row.get("id"),
        category: category_from_parts(
            row.get("category_id"),
            row.get("category_name"),
            row.get("category_slug"),
        ),
        title: row.get("title"),
        slug: row.get("slug"),
        image: row.get("image"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// PostgreSQL implementations
// ============================================================================

async fn create_post_postgres(pool: &PgPool, input: &CreatePostInput) -> Result<Post> {
    let now = Utc::now();

    let row = sqlx::query(
        r#"
        INSERT INTO posts (category_id, title, slug, image, excerpt, content, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(input.category_id)
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.image)
    .bind(&input.excerpt)
    .bind(&input.content)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| write_error(e, "Failed to create post"))?;

    get_post_by_id_postgres(pool, row.get("id"))
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after insert"))
}

async fn get_post_by_id_postgres(pool: &PgPool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("{} WHERE p.id = $1", SELECT_POST))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    Ok(row.as_ref().map(row_to_post_postgres))
}

async fn get_post_by_slug_postgres(pool: &PgPool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("{} WHERE p.slug = $1", SELECT_POST))
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by slug")?;

    Ok(row.as_ref().map(row_to_post_postgres))
}

async fn list_posts_postgres(pool: &PgPool) -> Result<Vec<Post>> {
    let rows = sqlx::query(&format!("{} ORDER BY p.created_at DESC, p.id DESC", SELECT_POST))
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    Ok(rows.iter().map(row_to_post_postgres).collect())
}

async fn update_post_postgres(pool: &PgPool, id: i64, input: &UpdatePostInput) -> Result<Post> {
    let existing = get_post_by_id_postgres(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found"))?;
    let merged = MergedPost::new(existing, input);

    sqlx::query(
        r#"
        UPDATE posts
        SET category_id = $1, title = $2, slug = $3, image = $4, excerpt = $5, content = $6
        WHERE id = $7
        "#,
    )
    .bind(merged.category_id)
    .bind(&merged.title)
    .bind(&merged.slug)
    .bind(&merged.image)
    .bind(&merged.excerpt)
    .bind(&merged.content)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| write_error(e, "Failed to update post"))?;

    get_post_by_id_postgres(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
}

async fn delete_post_postgres(pool: &PgPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(())
}

async fn exists_by_slug_postgres(pool: &PgPool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = $1")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check post slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_post_postgres(row: &sqlx::postgres::PgRow) -> Post {
    Post {
        id: row.get("id"),
        category: category_from_parts(
            row.get("category_id"),
            row.get("category_name"),
            row.get("category_slug"),
        ),
        title: row.get("title"),
        slug: row.get("slug"),
        image: row.get("image"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}
