//! Shared helpers for driving the router in-process against an in-memory
//! SQLite pool and a temporary image directory.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::{body::Body, Router};
use http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;
use tower::ServiceExt;

use news_backend::{
    db,
    routes::router,
    utils::{config::Config, state::AppState},
};

pub struct TestApp {
    pub router: Router,
    image_dir: TempDir,
}

impl TestApp {
    pub fn image_dir(&self) -> &Path {
        self.image_dir.path()
    }
}

pub async fn spawn_app() -> TestApp {
    let image_dir = TempDir::new().expect("create temp image dir");

    // A single connection keeps the in-memory database shared across queries.
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    db::create_tables(&db_pool).await.expect("create tables");
    db::seed_categories(&db_pool).await.expect("seed categories");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        image_dir: image_dir.path().to_path_buf(),
        port: 0,
    };
    let state = Arc::new(AppState { db_pool, config });

    TestApp {
        router: router(state),
        image_dir,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

/// Send a request and decode the JSON body, if any.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("request should not error");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, body)
}

/// Send a request and return the raw body plus the content type.
pub async fn send_raw(
    router: &Router,
    request: Request<Body>,
) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("request should not error");
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    (status, content_type, bytes.to_vec())
}

pub async fn category_id_by_name(router: &Router, name: &str) -> i64 {
    let (status, body) = send(router, get("/api/categories/")).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]
        .as_array()
        .expect("categories data should be an array")
        .iter()
        .find(|c| c["category_name"] == name)
        .and_then(|c| c["category_id"].as_i64())
        .unwrap_or_else(|| panic!("category {name} should be seeded"))
}

/// Create an article with an explicit creation-intent timestamp so ordering
/// assertions are deterministic.
pub async fn create_news(
    router: &Router,
    title: &str,
    category_ids: &[i64],
    timestamp: &str,
) -> i64 {
    let (status, body) = send(
        router,
        post_json(
            "/api/news/",
            json!({
                "title": title,
                "description": format!("{title} body text"),
                "short_description": format!("{title} in short"),
                "category_ids": category_ids,
                "source": "integration-test",
                "timestamp": timestamp,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    assert_eq!(body["success"], json!(true));
    body["data"]["id"].as_i64().expect("created article id")
}

pub async fn newest_title_count(router: &Router) -> usize {
    let (status, body) = send(router, get("/api/news/newest/titles?limit=50")).await;
    assert_eq!(status, StatusCode::OK);
    body["data"].as_array().expect("titles array").len()
}

/// A small valid PNG produced by the same codec the server validates with.
pub fn png_bytes() -> Vec<u8> {
    use image::{DynamicImage, ImageBuffer, Rgba};

    let img = ImageBuffer::<Rgba<u8>, _>::from_pixel(2, 2, Rgba([12, 34, 56, 255]));
    let mut buf = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

pub fn multipart_upload(
    uri: &str,
    filename: &str,
    bytes: &[u8],
    alt_text: Option<&str>,
) -> Request<Body> {
    let boundary = "test-boundary-7MA4YWxkTrZu0gW";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
    if let Some(alt) = alt_text {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"alt_text\"\r\n\r\n{alt}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("build request")
}
