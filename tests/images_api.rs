//! End-to-end tests for image upload validation, the publish-after-commit
//! file flow, and the raw fetch endpoints.

mod common;

use http::StatusCode;
use serde_json::json;

use common::{get, multipart_upload, png_bytes, send, send_raw, spawn_app};

fn files_in(dir: &std::path::Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .expect("read image dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect()
}

#[tokio::test]
async fn upload_rejects_disallowed_extension() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app.router,
        multipart_upload("/api/images/upload", "photo.bmp", &png_bytes(), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    assert!(files_in(app.image_dir()).is_empty(), "no file may be created");
}

#[tokio::test]
async fn upload_rejects_bytes_that_do_not_decode() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app.router,
        multipart_upload(
            "/api/images/upload",
            "photo.png",
            b"definitely not a png",
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid image"));

    assert!(files_in(app.image_dir()).is_empty());
}

#[tokio::test]
async fn upload_rejects_oversized_payload() {
    let app = spawn_app().await;

    // Valid PNG prefix padded past the cap; the size check fires before any
    // decode attempt.
    let mut oversized = png_bytes();
    oversized.resize(10 * 1024 * 1024 + 1, 0);

    let (status, body) = send(
        &app.router,
        multipart_upload("/api/images/upload", "big.png", &oversized, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("too large"));

    assert!(files_in(app.image_dir()).is_empty());
}

#[tokio::test]
async fn upload_then_fetch_returns_identical_bytes() {
    let app = spawn_app().await;
    let payload = png_bytes();

    let (status, body) = send(
        &app.router,
        multipart_upload("/api/images/upload", "photo.png", &payload, Some("a photo")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    assert_eq!(body["success"], json!(true));

    let data = &body["data"];
    let image_id = data["image_id"].as_i64().expect("image_id");
    let filename = data["filename"].as_str().expect("filename").to_owned();
    assert!(filename.ends_with(".png"));
    assert_eq!(
        data["location"].as_str().unwrap(),
        format!("/api/images/{filename}")
    );
    assert_eq!(data["alt_text"], json!("a photo"));

    // Only the published file exists; no temp leftovers.
    assert_eq!(files_in(app.image_dir()), vec![filename.clone()]);

    let (status, content_type, bytes) = send_raw(
        &app.router,
        get(&format!("/api/images/by-id/{image_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(bytes, payload);

    let (status, content_type, bytes) =
        send_raw(&app.router, get(&format!("/api/images/{filename}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(bytes, payload);
}

#[tokio::test]
async fn image_info_returns_metadata() {
    let app = spawn_app().await;

    let (_, body) = send(
        &app.router,
        multipart_upload("/api/images/upload", "pic.PNG", &png_bytes(), Some("alt")),
    )
    .await;
    let image_id = body["data"]["image_id"].as_i64().unwrap();

    let (status, body) = send(&app.router, get(&format!("/api/images/info/{image_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["image_id"].as_i64(), Some(image_id));
    assert_eq!(data["alt_text"], json!("alt"));
    assert!(data["created_at"].is_string());
    // Uppercase source extension is normalised on store.
    assert!(data["filename"].as_str().unwrap().ends_with(".png"));
}

#[tokio::test]
async fn missing_images_are_not_found() {
    let app = spawn_app().await;

    let (status, _) = send(&app.router, get("/api/images/nope.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, get("/api/images/by-id/404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app.router, get("/api/images/info/404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn traversal_filenames_are_rejected() {
    let app = spawn_app().await;

    let (status, _) = send(&app.router, get("/api/images/a..b.png")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn uploaded_image_can_back_a_news_article() {
    let app = spawn_app().await;
    let politics = common::category_id_by_name(&app.router, "politics").await;

    let (_, body) = send(
        &app.router,
        multipart_upload("/api/images/upload", "cover.png", &png_bytes(), None),
    )
    .await;
    let image_id = body["data"]["image_id"].as_i64().unwrap();
    let location = body["data"]["location"].as_str().unwrap().to_owned();

    let (status, body) = send(
        &app.router,
        common::post_json(
            "/api/news/",
            json!({
                "title": "Illustrated",
                "description": "body",
                "category_ids": [politics],
                "source": "integration-test",
                "image_id": image_id,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let news_id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = send(&app.router, get(&format!("/api/news/{news_id}"))).await;
    assert_eq!(body["data"]["image_id"].as_i64(), Some(image_id));
    assert_eq!(body["data"]["image_location"].as_str(), Some(location.as_str()));
}
