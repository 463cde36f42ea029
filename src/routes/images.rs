use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::{
    handlers::images::{get_image, get_image_by_id, get_image_info, upload_image},
    utils::{media::MAX_FILE_SIZE, state::AppState},
};

pub fn image_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(upload_image))
        .route("/info/{image_id}", get(get_image_info))
        .route("/by-id/{image_id}", get(get_image_by_id))
        .route("/{filename}", get(get_image))
        // Leave headroom above the cap so oversized payloads reach the
        // handler's own size check instead of the framework limit.
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024))
}
