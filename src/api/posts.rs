//! Post API endpoints
//!
//! - GET    /api/posts/?category=<slug>&search=<term> - List posts
//! - POST   /api/posts/ - Create post
//! - GET    /api/posts/{slug}/ - Get post
//! - PUT    /api/posts/{slug}/ - Replace post fields
//! - PATCH  /api/posts/{slug}/ - Update some post fields
//! - DELETE /api/posts/{slug}/ - Delete post
//!
//! Every route also answers without the trailing slash.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Deserializer};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::PostResponse;
use crate::models::{CreatePostInput, UpdatePostInput};
use crate::services::PostQuery;

/// Query parameters for listing posts
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    /// Category slug to filter by
    pub category: Option<String>,
    /// Case-insensitive substring of title or content
    pub search: Option<String>,
}

/// Request body for creating a post
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub category_id: Option<i64>,
    pub title: String,
    /// Derived from the title when absent or empty
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
}

/// Request body for PUT and PATCH.
///
/// Nullable fields distinguish "absent" (`None`) from an explicit `null`
/// (`Some(None)`), which clears the stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category_id: Option<Option<i64>>,
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub excerpt: Option<Option<String>>,
    pub content: Option<String>,
}

impl From<UpdatePostRequest> for UpdatePostInput {
    fn from(body: UpdatePostRequest) -> Self {
        Self {
            category_id: body.category_id,
            title: body.title,
            slug: body.slug,
            image: body.image,
            excerpt: body.excerpt,
            content: body.content,
        }
    }
}

/// Any present value, including `null`, becomes `Some`
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Build the posts router
pub fn router() -> Router<AppState> {
    let collection = get(list_posts).post(create_post);
    let item = get(get_post)
        .put(replace_post)
        .patch(update_post)
        .delete(delete_post);

    Router::new()
        .route("/api/posts", collection.clone())
        .route("/api/posts/", collection)
        .route("/api/posts/{slug}", item.clone())
        .route("/api/posts/{slug}/", item)
}

/// GET /api/posts/ - List posts, newest first
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let query = PostQuery::new(query.category, query.search);

    let posts = state.post_service.list(&query).await?;

    Ok(Json(posts.into_iter().map(Into::into).collect()))
}

/// POST /api/posts/ - Create post
async fn create_post(
    State(state): State<AppState>,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let input = CreatePostInput {
        category_id: body.category_id,
        title: body.title,
        slug: body.slug.unwrap_or_default(),
        image: body.image,
        excerpt: body.excerpt,
        content: body.content,
    };

    let post = state.post_service.create(input).await?;

    Ok((StatusCode::CREATED, Json(post.into())))
}

/// GET /api/posts/{slug}/ - Get post by slug
async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state
        .post_service
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post not found: {}", slug)))?;

    Ok(Json(post.into()))
}

/// PUT /api/posts/{slug}/ - Full update; `title`, `slug` and `content` are required
async fn replace_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let missing: Vec<&str> = [
        ("title", body.title.is_none()),
        ("slug", body.slug.is_none()),
        ("content", body.content.is_none()),
    ]
    .into_iter()
    .filter_map(|(field, absent)| absent.then_some(field))
    .collect();

    if !missing.is_empty() {
        return Err(ApiError::with_details(
            "VALIDATION_ERROR",
            format!("Missing required fields: {}", missing.join(", ")),
            serde_json::json!({ "fields": missing }),
        ));
    }

    let post = state.post_service.update(&slug, body.into()).await?;

    Ok(Json(post.into()))
}

/// PATCH /api/posts/{slug}/ - Partial update
async fn update_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.post_service.update(&slug, body.into()).await?;

    Ok(Json(post.into()))
}

/// DELETE /api/posts/{slug}/ - Delete post
async fn delete_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.post_service.delete(&slug).await?;

    Ok(StatusCode::NO_CONTENT)
}
