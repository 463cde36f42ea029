use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use http::StatusCode;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    models::{error::AppError, image::ImageRow, response::SuccessResponse},
    utils::{
        media::{extension_of, is_allowed_extension, media_type_for, ALLOWED_EXTENSIONS, MAX_FILE_SIZE},
        state::AppState,
    },
};

pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut alt_text: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let original_name = field
                    .file_name()
                    .map(str::to_owned)
                    .ok_or_else(|| {
                        AppError::BadRequest("file field is missing a filename".to_string())
                    })?;
                let contents = field.bytes().await?;
                file = Some((original_name, contents));
            }
            Some("alt_text") => alt_text = Some(field.text().await?),
            _ => {}
        }
    }

    let (original_name, contents) =
        file.ok_or_else(|| AppError::BadRequest("missing file field".to_string()))?;

    info!("Received upload request for file: {original_name}");

    let ext = extension_of(&original_name)
        .filter(|ext| is_allowed_extension(ext))
        .ok_or_else(|| {
            warn!("Invalid file extension on upload: {original_name}");
            AppError::BadRequest(format!(
                "Invalid file type. Allowed types: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;

    if contents.len() > MAX_FILE_SIZE {
        warn!("File too large: {} bytes", contents.len());
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size: {}MB",
            MAX_FILE_SIZE / (1024 * 1024)
        )));
    }

    // The bytes must decode as a real image; the extension alone is not
    // trusted.
    if image::load_from_memory(&contents).is_err() {
        warn!("Invalid image file: {original_name}");
        return Err(AppError::BadRequest("Invalid image file".to_string()));
    }

    let filename = format!("{}.{ext}", Uuid::new_v4());
    let location = format!("/api/images/{filename}");
    let tmp_path = state.config.image_dir.join(format!("{filename}.tmp"));
    let final_path = state.config.image_dir.join(&filename);

    // Write to a temporary path first, commit the row, then publish the file
    // with an atomic rename. Any failure along the way removes the temp file
    // so no orphan is left behind.
    tokio::fs::write(&tmp_path, &contents).await?;

    let created = match insert_image_row(&state.db_pool, &location, &filename, alt_text.as_deref())
        .await
    {
        Ok(row) => row,
        Err(err) => {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }
    };
    if let Err(err) = tokio::fs::rename(&tmp_path, &final_path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(err.into());
    }

    info!("Image uploaded successfully with ID: {}", created.id);

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(
            "Image uploaded successfully",
            json!({
                "image_id": created.id,
                "location": created.location,
                "filename": created.filename,
                "alt_text": created.alt_text,
            }),
        )),
    ))
}

async fn insert_image_row(
    pool: &SqlitePool,
    location: &str,
    filename: &str,
    alt_text: Option<&str>,
) -> Result<ImageRow, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, ImageRow>(
        "INSERT INTO images (location, filename, alt_text, created_at) VALUES (?, ?, ?, ?) \
         RETURNING id, location, filename, alt_text, created_at",
    )
    .bind(location)
    .bind(filename)
    .bind(alt_text)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(row)
}

pub async fn get_image(
    Path(filename): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    info!("Fetching image: {filename}");

    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(AppError::BadRequest("Invalid filename".to_string()));
    }

    let path = state.config.image_dir.join(&filename);
    serve_file(&path, &filename).await
}

pub async fn get_image_by_id(
    Path(image_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    info!("Fetching image with ID: {image_id}");

    let image = fetch_image_row(&state.db_pool, image_id).await?;
    let path = state.config.image_dir.join(&image.filename);
    serve_file(&path, &image.filename).await
}

pub async fn get_image_info(
    Path(image_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    info!("Fetching image info for ID: {image_id}");

    let image = fetch_image_row(&state.db_pool, image_id).await?;

    Ok(Json(SuccessResponse::new(
        "Image info retrieved successfully",
        json!({
            "image_id": image.id,
            "location": image.location,
            "filename": image.filename,
            "alt_text": image.alt_text,
            "created_at": image.created_at,
        }),
    )))
}

async fn fetch_image_row(pool: &SqlitePool, image_id: i64) -> Result<ImageRow, AppError> {
    sqlx::query_as::<_, ImageRow>(
        "SELECT id, location, filename, alt_text, created_at FROM images WHERE id = ?",
    )
    .bind(image_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        warn!("Image with ID {image_id} not found");
        AppError::NotFound(format!("Image with ID {image_id} not found"))
    })
}

async fn serve_file(path: &FsPath, filename: &str) -> Result<Response, AppError> {
    let contents = match tokio::fs::read(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("Image file not found: {filename}");
            return Err(AppError::NotFound("Image not found".to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    info!("Image retrieved successfully: {filename}");

    Ok(([(header::CONTENT_TYPE, media_type_for(filename))], contents).into_response())
}
