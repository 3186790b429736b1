//! API layer - HTTP handlers and routing
//!
//! All JSON endpoints live under `/api` and answer with or without a
//! trailing slash. Uploaded media and collected static assets are served
//! from disk next to them.

pub mod categories;
pub mod middleware;
pub mod posts;
pub mod responses;
pub mod upload;

#[cfg(test)]
mod tests;

use axum::{routing::get, Json, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use responses::ApiRootResponse;

pub use middleware::{cors_layer, ApiError, AppState};

/// Build the JSON API router
pub fn build_api_router(max_upload_size: u64) -> Router<AppState> {
    Router::new()
        .route("/api", get(api_root))
        .route("/api/", get(api_root))
        .merge(posts::router())
        .merge(categories::router())
        .merge(upload::router(max_upload_size))
}

/// Build the complete router with file serving and middleware
pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .merge(build_api_router(config.media.max_file_size))
        .nest_service(config.media.url_prefix(), ServeDir::new(&config.media.root))
        .nest_service(
            config.static_files.url.trim_end_matches('/'),
            ServeDir::new(&config.static_files.root),
        )
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /api/ - Links to the collections
async fn api_root() -> Json<ApiRootResponse> {
    Json(ApiRootResponse {
        posts: "/api/posts/".to_string(),
        categories: "/api/categories/".to_string(),
    })
}
