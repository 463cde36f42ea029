use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    models::{
        category::CategoryInfo,
        error::AppError,
        news::{
            CreateNewsRequest, MultipleCategoriesRequest, NewsDetail, NewsListItem, NewsRow,
            NewsTitle,
        },
        response::SuccessResponse,
    },
    utils::state::AppState,
};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 50;

#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<i64>,
}

/// Result caps are enforced here, before any query runs.
fn resolve_limit(limit: Option<i64>) -> Result<i64, AppError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}, got {limit}"
        )));
    }
    Ok(limit)
}

fn validate_create(payload: &CreateNewsRequest) -> Result<(), AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }
    if payload.title.chars().count() > 255 {
        return Err(AppError::BadRequest(
            "title must be at most 255 characters".to_string(),
        ));
    }
    if payload.description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "description must not be empty".to_string(),
        ));
    }
    if let Some(short) = &payload.short_description {
        if short.chars().count() > 500 {
            return Err(AppError::BadRequest(
                "short_description must be at most 500 characters".to_string(),
            ));
        }
    }
    if payload.source.trim().is_empty() {
        return Err(AppError::BadRequest("source must not be empty".to_string()));
    }
    if payload.source.chars().count() > 255 {
        return Err(AppError::BadRequest(
            "source must be at most 255 characters".to_string(),
        ));
    }
    if payload.category_ids.is_empty() {
        return Err(AppError::BadRequest(
            "at least one category id is required".to_string(),
        ));
    }
    Ok(())
}

fn unique_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = BTreeSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Requested category ids that do not exist, sorted ascending.
async fn missing_category_ids(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
    let mut missing = Vec::new();
    for id in unique_ids(ids) {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        if found.is_none() {
            missing.push(id);
        }
    }
    missing.sort_unstable();
    Ok(missing)
}

async fn categories_for_news(
    pool: &SqlitePool,
    news_id: i64,
) -> Result<Vec<CategoryInfo>, sqlx::Error> {
    sqlx::query_as::<_, CategoryInfo>(
        "SELECT c.id, c.name FROM categories c \
         JOIN news_categories nc ON nc.category_id = c.id \
         WHERE nc.news_id = ? ORDER BY c.id",
    )
    .bind(news_id)
    .fetch_all(pool)
    .await
}

async fn image_location(
    pool: &SqlitePool,
    image_id: Option<i64>,
) -> Result<Option<String>, sqlx::Error> {
    match image_id {
        Some(id) => {
            sqlx::query_scalar("SELECT location FROM images WHERE id = ?")
                .bind(id)
                .fetch_optional(pool)
                .await
        }
        None => Ok(None),
    }
}

async fn to_detail(pool: &SqlitePool, row: &NewsRow) -> Result<NewsDetail, sqlx::Error> {
    let categories = categories_for_news(pool, row.id).await?;
    let location = image_location(pool, row.image_id).await?;
    Ok(NewsDetail::from_row(row, categories, location))
}

async fn category_exists(pool: &SqlitePool, category_id: i64) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn create_news(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateNewsRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("Creating new news article: {}", payload.title);

    validate_create(&payload)?;

    if let Some(image_id) = payload.image_id {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM images WHERE id = ?")
            .bind(image_id)
            .fetch_optional(&state.db_pool)
            .await?;
        if found.is_none() {
            warn!("Image ID {image_id} not found");
            return Err(AppError::NotFound(format!(
                "Image with ID {image_id} not found"
            )));
        }
    }

    let missing = missing_category_ids(&state.db_pool, &payload.category_ids).await?;
    if !missing.is_empty() {
        warn!("Category IDs not found: {missing:?}");
        return Err(AppError::NotFound(format!(
            "Categories with IDs {missing:?} not found"
        )));
    }

    let now = Utc::now();
    let timestamp = payload.timestamp.unwrap_or(now);

    let mut tx = state.db_pool.begin().await?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO news (title, description, short_description, source, image_id, timestamp, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.short_description)
    .bind(&payload.source)
    .bind(payload.image_id)
    .bind(timestamp)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for category_id in unique_ids(&payload.category_ids) {
        sqlx::query("INSERT INTO news_categories (news_id, category_id) VALUES (?, ?)")
            .bind(id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    info!("News article created successfully with ID: {id}");

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(
            "News article created successfully",
            json!({"id": id, "title": payload.title, "created_at": now}),
        )),
    ))
}

pub async fn get_news_by_id(
    Path(news_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    info!("Fetching news article with ID: {news_id}");

    let row = sqlx::query_as::<_, NewsRow>(
        "SELECT id, title, description, short_description, source, image_id, timestamp, created_at \
         FROM news WHERE id = ?",
    )
    .bind(news_id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| {
        warn!("News article with ID {news_id} not found");
        AppError::NotFound(format!("News article with ID {news_id} not found"))
    })?;

    let detail = to_detail(&state.db_pool, &row).await?;

    info!("Successfully fetched news article: {}", row.title);

    Ok(Json(SuccessResponse::new(
        "News article retrieved successfully",
        detail,
    )))
}

pub async fn get_newest_titles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = resolve_limit(params.limit)?;
    info!("Fetching {limit} newest news titles");

    let rows = sqlx::query_as::<_, NewsRow>(
        "SELECT id, title, description, short_description, source, image_id, timestamp, created_at \
         FROM news ORDER BY timestamp DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(&state.db_pool)
    .await?;

    let titles: Vec<NewsTitle> = rows.iter().map(NewsTitle::from_row).collect();

    info!("Found {} newest news titles", titles.len());

    Ok(Json(SuccessResponse::new(
        format!("Found {} newest news titles", titles.len()),
        titles,
    )))
}

pub async fn get_newest_full(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = resolve_limit(params.limit)?;
    info!("Fetching {limit} newest full news articles");

    let rows = sqlx::query_as::<_, NewsRow>(
        "SELECT id, title, description, short_description, source, image_id, timestamp, created_at \
         FROM news ORDER BY timestamp DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(&state.db_pool)
    .await?;

    let mut news_list = Vec::with_capacity(rows.len());
    for row in &rows {
        news_list.push(to_detail(&state.db_pool, row).await?);
    }

    info!("Found {} newest full news articles", news_list.len());

    Ok(Json(SuccessResponse::new(
        format!("Found {} newest news articles", news_list.len()),
        news_list,
    )))
}

pub async fn get_titles_by_category(
    Path(category_id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = resolve_limit(params.limit)?;
    info!("Fetching news titles for category ID: {category_id}");

    if !category_exists(&state.db_pool, category_id).await? {
        warn!("Category ID {category_id} not found");
        return Err(AppError::NotFound(format!(
            "Category with ID {category_id} not found"
        )));
    }

    let rows = news_in_category(&state.db_pool, category_id, limit).await?;
    let titles: Vec<NewsTitle> = rows.iter().map(NewsTitle::from_row).collect();

    info!(
        "Found {} news titles for category ID: {category_id}",
        titles.len()
    );

    Ok(Json(SuccessResponse::new(
        format!("Found {} news titles", titles.len()),
        titles,
    )))
}

pub async fn get_full_by_category(
    Path(category_id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = resolve_limit(params.limit)?;
    info!("Fetching full news articles for category ID: {category_id}");

    if !category_exists(&state.db_pool, category_id).await? {
        warn!("Category ID {category_id} not found");
        return Err(AppError::NotFound(format!(
            "Category with ID {category_id} not found"
        )));
    }

    let rows = news_in_category(&state.db_pool, category_id, limit).await?;
    let mut news_list = Vec::with_capacity(rows.len());
    for row in &rows {
        news_list.push(to_detail(&state.db_pool, row).await?);
    }

    info!(
        "Found {} full news articles for category ID: {category_id}",
        news_list.len()
    );

    Ok(Json(SuccessResponse::new(
        format!("Found {} news articles", news_list.len()),
        news_list,
    )))
}

async fn news_in_category(
    pool: &SqlitePool,
    category_id: i64,
    limit: i64,
) -> Result<Vec<NewsRow>, sqlx::Error> {
    sqlx::query_as::<_, NewsRow>(
        "SELECT n.id, n.title, n.description, n.short_description, n.source, n.image_id, \
                n.timestamp, n.created_at \
         FROM news n \
         JOIN news_categories nc ON nc.news_id = n.id \
         WHERE nc.category_id = ? \
         ORDER BY n.timestamp DESC, n.id DESC LIMIT ?",
    )
    .bind(category_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn get_titles_by_multiple_categories(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MultipleCategoriesRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("Fetching news for category IDs: {:?}", request.category_ids);

    if request.category_ids.is_empty() {
        return Err(AppError::BadRequest(
            "at least one category id is required".to_string(),
        ));
    }
    let limit = resolve_limit(request.limit_per_category)?;

    let missing = missing_category_ids(&state.db_pool, &request.category_ids).await?;
    if !missing.is_empty() {
        warn!("Category IDs not found: {missing:?}");
        return Err(AppError::NotFound(format!(
            "Categories with IDs {missing:?} not found"
        )));
    }

    // One bounded query per category; the merged set is de-duplicated by news
    // id and re-sorted globally, newest first.
    let mut seen = BTreeSet::new();
    let mut all_news: Vec<NewsListItem> = Vec::new();
    for category_id in unique_ids(&request.category_ids) {
        let rows = news_in_category(&state.db_pool, category_id, limit).await?;
        for row in &rows {
            if !seen.insert(row.id) {
                continue;
            }
            let categories = categories_for_news(&state.db_pool, row.id).await?;
            all_news.push(NewsListItem::from_row(row, categories));
        }
    }
    all_news.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

    info!(
        "Found {} news items across {} categories",
        all_news.len(),
        request.category_ids.len()
    );

    Ok(Json(SuccessResponse::new(
        format!("Found {} news items", all_news.len()),
        all_news,
    )))
}

pub async fn search_news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.q.trim().is_empty() {
        return Err(AppError::BadRequest(
            "search query must not be empty".to_string(),
        ));
    }
    let limit = resolve_limit(params.limit)?;
    info!("Searching news with query: {}", params.q);

    // SQLite LIKE is case-insensitive for ASCII, matching the substring
    // containment contract.
    let pattern = format!("%{}%", params.q);
    let rows = sqlx::query_as::<_, NewsRow>(
        "SELECT id, title, description, short_description, source, image_id, timestamp, created_at \
         FROM news WHERE title LIKE ? ORDER BY timestamp DESC, id DESC LIMIT ?",
    )
    .bind(&pattern)
    .bind(limit)
    .fetch_all(&state.db_pool)
    .await?;

    let titles: Vec<NewsTitle> = rows.iter().map(NewsTitle::from_row).collect();

    info!(
        "Found {} news items matching query: {}",
        titles.len(),
        params.q
    );

    Ok(Json(SuccessResponse::new(
        format!("Found {} news items matching '{}'", titles.len(), params.q),
        titles,
    )))
}
