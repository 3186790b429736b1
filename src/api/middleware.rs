//! Shared API state, error type and cross-cutting layers

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{CorsConfig, MediaConfig};
use crate::db::repositories::{SqlxCategoryRepository, SqlxPostRepository};
use crate::db::DynDatabasePool;
use crate::services::{CategoryService, CategoryServiceError, PostService, PostServiceError};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub category_service: Arc<CategoryService>,
    pub post_service: Arc<PostService>,
    pub media: Arc<MediaConfig>,
}

impl AppState {
    /// Wire repositories and services over one pool
    pub fn new(pool: DynDatabasePool, media: MediaConfig) -> Self {
        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let post_repo = SqlxPostRepository::boxed(pool);

        Self {
            category_service: Arc::new(CategoryService::new(category_repo.clone())),
            post_service: Arc::new(PostService::new(post_repo, category_repo)),
            media: Arc::new(media),
        }
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// A slug (or other unique field) collides with an existing record
    pub fn conflict(field: &str, value: &str, message: impl Into<String>) -> Self {
        Self::with_details(
            "CONFLICT",
            message,
            serde_json::json!({"field": field, "value": value}),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!("Internal error: {}", message);
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<CategoryServiceError> for ApiError {
    fn from(e: CategoryServiceError) -> Self {
        match e {
            CategoryServiceError::NotFound(slug) => {
                ApiError::not_found(format!("Category not found: {}", slug))
            }
            CategoryServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            CategoryServiceError::DuplicateSlug(slug) => ApiError::conflict(
                "slug",
                &slug,
                format!("Category slug already exists: {}", slug),
            ),
            CategoryServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

impl From<PostServiceError> for ApiError {
    fn from(e: PostServiceError) -> Self {
        match e {
            PostServiceError::NotFound(slug) => {
                ApiError::not_found(format!("Post not found: {}", slug))
            }
            PostServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            PostServiceError::DuplicateSlug(slug) => ApiError::conflict(
                "slug",
                &slug,
                format!("Post slug already exists: {}", slug),
            ),
            PostServiceError::CategoryNotFound(id) => ApiError::with_details(
                "VALIDATION_ERROR",
                format!("Category does not exist: {}", id),
                serde_json::json!({"field": "category_id", "value": id}),
            ),
            PostServiceError::InternalError(e) => ApiError::internal_error(format!("{:#}", e)),
        }
    }
}

/// Build the CORS layer.
///
/// `allow_all_origins` wins over the allow-list. Credentials are never
/// allowed, so the wildcard origin stays valid.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    if config.allow_all_origins {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::validation_error("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::conflict("slug", "a", "x").status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::new("SOMETHING_ELSE", "x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_shape() {
        let json = serde_json::to_value(ApiError::not_found("gone")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": {"code": "NOT_FOUND", "message": "gone"}})
        );

        let json = serde_json::to_value(ApiError::conflict("slug", "dup", "taken")).unwrap();
        assert_eq!(json["error"]["details"]["field"], "slug");
        assert_eq!(json["error"]["details"]["value"], "dup");
    }

    #[test]
    fn test_service_error_mapping() {
        let err: ApiError = PostServiceError::CategoryNotFound(9).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error.code, "VALIDATION_ERROR");

        let err: ApiError = PostServiceError::DuplicateSlug("a".to_string()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ApiError = CategoryServiceError::NotFound("tech".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: ApiError = CategoryServiceError::InternalError(anyhow::anyhow!("boom")).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
