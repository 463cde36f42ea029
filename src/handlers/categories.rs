use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use tracing::info;

use crate::{
    models::{category::CategoryInfo, error::AppError, response::SuccessResponse},
    utils::state::AppState,
};

pub async fn get_all_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    info!("Fetching all categories");

    let categories =
        sqlx::query_as::<_, CategoryInfo>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&state.db_pool)
            .await?;

    info!("Found {} categories", categories.len());

    Ok(Json(SuccessResponse::new(
        format!("Found {} categories", categories.len()),
        categories,
    )))
}
