//! HTTP tests against the full router

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use super::{build_router, AppState};
use crate::config::Config;
use crate::db::{create_test_pool, migrations};

struct TestApp {
    server: TestServer,
    _media: TempDir,
}

async fn setup_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let media = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.media.root = media.path().join("media");
    config.static_files.root = media.path().join("static");
    configure(&mut config);

    let state = AppState::new(pool, config.media.clone());
    let server = TestServer::new(build_router(state, &config)).expect("Failed to start server");

    TestApp {
        server,
        _media: media,
    }
}

async fn setup() -> TestApp {
    setup_with(|_| {}).await
}

async fn create_category(app: &TestApp, name: &str, slug: &str) -> Value {
    let response = app
        .server
        .post("/api/categories/")
        .json(&json!({"name": name, "slug": slug}))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

async fn create_post(app: &TestApp, body: Value) -> Value {
    let response = app.server.post("/api/posts/").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

/// A PNG signature followed by filler bytes
fn png_bytes() -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend_from_slice(b"not a real image");
    data
}

async fn upload(app: &TestApp, data: Vec<u8>, file_name: &str, mime: &str) -> axum_test::TestResponse {
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(data).file_name(file_name).mime_type(mime),
    );
    app.server.post("/api/upload/image").multipart(form).await
}

fn titles(posts: &Value) -> Vec<String> {
    posts
        .as_array()
        .expect("listing should be an array")
        .iter()
        .map(|p| p["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

// ============================================================================
// Root and routing
// ============================================================================

#[tokio::test]
async fn test_api_root_links_collections() {
    let app = setup().await;

    let response = app.server.get("/api/").await;
    response.assert_status_ok();
    let body = response.json::<Value>();

    assert_eq!(body["posts"], "/api/posts/");
    assert_eq!(body["categories"], "/api/categories/");
}

#[tokio::test]
async fn test_routes_answer_with_and_without_trailing_slash() {
    let app = setup().await;
    create_category(&app, "Tech", "tech").await;

    for path in ["/api/categories", "/api/categories/", "/api/categories/tech", "/api/categories/tech/"] {
        app.server.get(path).await.assert_status_ok();
    }
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
async fn test_category_crud() {
    let app = setup().await;

    let created = create_category(&app, "Tech", "tech").await;
    assert!(created["id"].as_i64().unwrap() > 0);

    let generated = app
        .server
        .post("/api/categories/")
        .json(&json!({"name": "Daily Life"}))
        .await;
    generated.assert_status(StatusCode::CREATED);
    assert_eq!(generated.json::<Value>()["slug"], "daily-life");

    let list = app.server.get("/api/categories/").await.json::<Value>();
    let slugs: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["slug"].as_str())
        .collect();
    assert_eq!(slugs, vec!["tech", "daily-life"]);

    let patched = app
        .server
        .patch("/api/categories/tech/")
        .json(&json!({"name": "Technology"}))
        .await;
    patched.assert_status_ok();
    assert_eq!(patched.json::<Value>()["name"], "Technology");

    let replaced = app
        .server
        .put("/api/categories/tech/")
        .json(&json!({"name": "Programming", "slug": "programming"}))
        .await;
    replaced.assert_status_ok();
    app.server
        .get("/api/categories/tech/")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .delete("/api/categories/programming/")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .get("/api/categories/programming/")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_put_requires_all_fields() {
    let app = setup().await;
    create_category(&app, "Tech", "tech").await;

    let response = app
        .server
        .put("/api/categories/tech/")
        .json(&json!({"name": "Only name"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_duplicate_category_slug_conflicts() {
    let app = setup().await;
    create_category(&app, "Tech", "tech").await;

    let response = app
        .server
        .post("/api/categories/")
        .json(&json!({"name": "Tech again", "slug": "tech"}))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(body["error"]["details"]["field"], "slug");
}

#[tokio::test]
async fn test_invalid_category_rejected() {
    let app = setup().await;

    let response = app
        .server
        .post("/api/categories/")
        .json(&json!({"name": "", "slug": "empty"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/api/categories/")
        .json(&json!({"name": "Bad", "slug": "no spaces allowed"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Posts
// ============================================================================

#[tokio::test]
async fn test_create_post_embeds_category() {
    let app = setup().await;
    let tech = create_category(&app, "Tech", "tech").await;

    let post = create_post(
        &app,
        json!({
            "category_id": tech["id"],
            "title": "Hello World",
            "content": "<p>Hi there</p>",
            "excerpt": "Greeting",
        }),
    )
    .await;

    assert_eq!(post["slug"], "hello-world");
    assert_eq!(post["category"], tech);
    assert_eq!(post["excerpt"], "Greeting");
    assert!(post["image"].is_null());
    assert!(post.get("category_id").is_none());

    let created_at = post["created_at"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());

    let fetched = app.server.get("/api/posts/hello-world/").await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<Value>(), post);
}

#[tokio::test]
async fn test_create_post_with_unknown_category_is_bad_request() {
    let app = setup().await;

    let response = app
        .server
        .post("/api/posts/")
        .json(&json!({"category_id": 999, "title": "T", "content": "C"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["field"], "category_id");
}

#[tokio::test]
async fn test_duplicate_post_slug_conflicts() {
    let app = setup().await;
    create_post(&app, json!({"title": "Same", "content": "a"})).await;

    let response = app
        .server
        .post("/api/posts/")
        .json(&json!({"title": "Same", "content": "b"}))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_posts_filters() {
    let app = setup().await;
    let tech = create_category(&app, "Tech", "tech").await;
    let life = create_category(&app, "Life", "life").await;

    create_post(
        &app,
        json!({"category_id": tech["id"], "title": "Hello World", "content": "<p>First</p>"}),
    )
    .await;
    create_post(
        &app,
        json!({"category_id": tech["id"], "title": "Goodbye", "content": "<p>So long, world</p>"}),
    )
    .await;
    create_post(
        &app,
        json!({"category_id": life["id"], "title": "Unrelated", "content": "<p>Gardening</p>"}),
    )
    .await;

    let all = app.server.get("/api/posts/").await.json::<Value>();
    assert_eq!(titles(&all), vec!["Unrelated", "Goodbye", "Hello World"]);

    let by_category = app
        .server
        .get("/api/posts/")
        .add_query_param("category", "tech")
        .await
        .json::<Value>();
    assert_eq!(titles(&by_category), vec!["Goodbye", "Hello World"]);

    let by_search = app
        .server
        .get("/api/posts/")
        .add_query_param("search", "WORLD")
        .await
        .json::<Value>();
    assert_eq!(titles(&by_search), vec!["Goodbye", "Hello World"]);

    let both = app
        .server
        .get("/api/posts/")
        .add_query_param("category", "tech")
        .add_query_param("search", "world")
        .await
        .json::<Value>();
    assert_eq!(titles(&both), vec!["Goodbye", "Hello World"]);

    let none = app
        .server
        .get("/api/posts/")
        .add_query_param("category", "life")
        .add_query_param("search", "world")
        .await;
    none.assert_status_ok();
    assert!(titles(&none.json::<Value>()).is_empty());

    let unknown = app
        .server
        .get("/api/posts/")
        .add_query_param("category", "nonexistent")
        .await;
    unknown.assert_status_ok();
    assert!(titles(&unknown.json::<Value>()).is_empty());

    let empty_params = app.server.get("/api/posts/?category=&search=").await.json::<Value>();
    assert_eq!(titles(&empty_params).len(), 3);
}

#[tokio::test]
async fn test_patch_post_null_clears_and_absent_keeps() {
    let app = setup().await;
    let tech = create_category(&app, "Tech", "tech").await;
    create_post(
        &app,
        json!({
            "category_id": tech["id"],
            "title": "Title",
            "slug": "title",
            "content": "Body",
            "excerpt": "Short",
        }),
    )
    .await;

    let response = app
        .server
        .patch("/api/posts/title/")
        .json(&json!({"excerpt": null, "title": "Renamed"}))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();

    assert_eq!(body["title"], "Renamed");
    assert!(body["excerpt"].is_null());
    assert_eq!(body["category"]["slug"], "tech");

    let response = app
        .server
        .patch("/api/posts/title")
        .json(&json!({"category_id": null}))
        .await;
    response.assert_status_ok();
    assert!(response.json::<Value>()["category"].is_null());
}

#[tokio::test]
async fn test_put_post_requires_fields_and_keeps_created_at() {
    let app = setup().await;
    let created = create_post(&app, json!({"title": "Title", "content": "Body"})).await;

    let response = app
        .server
        .put("/api/posts/title/")
        .json(&json!({"title": "Only title"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .put("/api/posts/title/")
        .json(&json!({"title": "New", "slug": "new", "content": "New body"}))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();

    assert_eq!(body["slug"], "new");
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["created_at"], created["created_at"]);
}

#[tokio::test]
async fn test_delete_post_then_not_found() {
    let app = setup().await;
    create_post(&app, json!({"title": "Gone soon", "content": "x"})).await;

    app.server
        .delete("/api/posts/gone-soon/")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = app.server.get("/api/posts/gone-soon/").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "NOT_FOUND");

    app.server
        .delete("/api/posts/gone-soon/")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_category_deletes_its_posts() {
    let app = setup().await;
    let tech = create_category(&app, "Tech", "tech").await;
    create_post(&app, json!({"category_id": tech["id"], "title": "A", "content": "x"})).await;
    create_post(&app, json!({"title": "Loose", "content": "x"})).await;

    app.server
        .delete("/api/categories/tech/")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let all = app.server.get("/api/posts/").await.json::<Value>();
    assert_eq!(titles(&all), vec!["Loose"]);
}

// ============================================================================
// Media and CORS
// ============================================================================

#[tokio::test]
async fn test_upload_image_is_served_from_media_url() {
    let app = setup().await;

    let response = upload(&app, png_bytes(), "cover.png", "image/png").await;
    response.assert_status_ok();
    let body = response.json::<Value>();

    let url = body["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/media/blog_images/"));
    assert!(url.ends_with(".png"));
    assert_eq!(body["size"], 24);

    let served = app.server.get(&url).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), png_bytes().as_slice());

    let post = create_post(&app, json!({"title": "With image", "content": "x", "image": url})).await;
    assert_eq!(post["image"], body["url"]);
}

#[tokio::test]
async fn test_upload_ignores_client_file_extension() {
    let app = setup().await;

    let response = upload(&app, png_bytes(), "evil.html", "image/png").await;
    response.assert_status_ok();
    let url = response.json::<Value>()["url"].as_str().unwrap().to_string();
    assert!(url.ends_with(".png"), "stored as {}", url);

    let served = app.server.get(&url).await;
    served.assert_status_ok();
    assert_eq!(served.header(header::CONTENT_TYPE), "image/png");
}

#[tokio::test]
async fn test_upload_rejects_content_not_matching_type() {
    let app = setup().await;

    let response = upload(
        &app,
        b"<script>alert(1)</script>".to_vec(),
        "evil.html",
        "image/png",
    )
    .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = upload(&app, png_bytes(), "cover.jpg", "image/jpeg").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejects_disallowed_type() {
    let app = setup().await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"%PDF".to_vec())
            .file_name("doc.pdf")
            .mime_type("application/pdf"),
    );
    let response = app.server.post("/api/upload/image").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejects_oversized_file() {
    let app = setup_with(|config| config.media.max_file_size = 8).await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![0u8; 32])
            .file_name("big.png")
            .mime_type("image/png"),
    );
    let response = app.server.post("/api/upload/image").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let app = setup().await;

    let response = app
        .server
        .get("/api/posts/")
        .add_header(header::ORIGIN, HeaderValue::from_static("https://anywhere.example"))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
}

#[tokio::test]
async fn test_cors_allow_list() {
    let app = setup_with(|config| {
        config.cors.allow_all_origins = false;
        config.cors.allowed_origins = vec!["http://localhost:3000".to_string()];
    })
    .await;

    let allowed = app
        .server
        .get("/api/posts/")
        .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:3000"))
        .await;
    assert_eq!(
        allowed.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "http://localhost:3000"
    );

    let denied = app
        .server
        .get("/api/posts/")
        .add_header(header::ORIGIN, HeaderValue::from_static("https://evil.example"))
        .await;
    assert!(denied
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
