//! Category API endpoints
//!
//! - GET    /api/categories/ - List categories
//! - POST   /api/categories/ - Create category
//! - GET    /api/categories/{slug}/ - Get category
//! - PUT    /api/categories/{slug}/ - Replace category fields
//! - PATCH  /api/categories/{slug}/ - Update some category fields
//! - DELETE /api/categories/{slug}/ - Delete category and its posts

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::CategoryResponse;
use crate::models::{CreateCategoryInput, UpdateCategoryInput};

/// Request body for PUT and PATCH
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// Build the categories router
pub fn router() -> Router<AppState> {
    let collection = get(list_categories).post(create_category);
    let item = get(get_category)
        .put(replace_category)
        .patch(update_category)
        .delete(delete_category);

    Router::new()
        .route("/api/categories", collection.clone())
        .route("/api/categories/", collection)
        .route("/api/categories/{slug}", item.clone())
        .route("/api/categories/{slug}/", item)
}

/// GET /api/categories/ - List all categories
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.category_service.list().await?;

    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// POST /api/categories/ - Create category
async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryInput>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let category = state.category_service.create(body).await?;

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// GET /api/categories/{slug}/ - Get category by slug
async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state
        .category_service
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Category not found: {}", slug)))?;

    Ok(Json(category.into()))
}

/// PUT /api/categories/{slug}/ - Full update; `name` and `slug` are required
async fn replace_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    if body.name.is_none() || body.slug.is_none() {
        return Err(ApiError::validation_error(
            "Missing required fields: name and slug",
        ));
    }

    update_category(State(state), Path(slug), Json(body)).await
}

/// PATCH /api/categories/{slug}/ - Partial update
async fn update_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let input = UpdateCategoryInput {
        name: body.name,
        slug: body.slug,
    };

    let category = state.category_service.update(&slug, input).await?;

    Ok(Json(category.into()))
}

/// DELETE /api/categories/{slug}/ - Delete category; its posts go with it
async fn delete_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.category_service.delete(&slug).await?;

    Ok(StatusCode::NO_CONTENT)
}
