use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::models::category::CategoryInfo;

/// A persisted news row. `updated_at` is reserved in the schema but never
/// written, so it is not carried here.
#[derive(FromRow, Debug, Clone)]
pub struct NewsRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub short_description: Option<String>,
    pub source: String,
    pub image_id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug)]
pub struct CreateNewsRequest {
    pub title: String,
    pub description: String,
    pub short_description: Option<String>,
    pub category_ids: Vec<i64>,
    pub source: String,
    pub image_id: Option<i64>,
    /// Creation-intent time; defaults to the insert time when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug)]
pub struct MultipleCategoriesRequest {
    pub category_ids: Vec<i64>,
    pub limit_per_category: Option<i64>,
}

/// Lightweight projection for listing endpoints.
#[derive(Serialize, Debug, Clone)]
pub struct NewsTitle {
    pub id: i64,
    pub title: String,
    pub short_description: Option<String>,
    pub image_id: Option<i64>,
}

impl NewsTitle {
    pub fn from_row(row: &NewsRow) -> Self {
        Self {
            id: row.id,
            title: row.title.clone(),
            short_description: row.short_description.clone(),
            image_id: row.image_id,
        }
    }
}

/// Title projection plus resolved categories, timestamp, and source.
#[derive(Serialize, Debug, Clone)]
pub struct NewsListItem {
    pub id: i64,
    pub title: String,
    pub short_description: Option<String>,
    pub categories: Vec<CategoryInfo>,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl NewsListItem {
    pub fn from_row(row: &NewsRow, categories: Vec<CategoryInfo>) -> Self {
        Self {
            id: row.id,
            title: row.title.clone(),
            short_description: row.short_description.clone(),
            categories,
            timestamp: row.timestamp,
            source: row.source.clone(),
        }
    }
}

/// Full projection for the detail endpoints. `image_location` is null when no
/// image is associated.
#[derive(Serialize, Debug, Clone)]
pub struct NewsDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub short_description: Option<String>,
    pub categories: Vec<CategoryInfo>,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub image_id: Option<i64>,
    pub image_location: Option<String>,
}

impl NewsDetail {
    pub fn from_row(
        row: &NewsRow,
        categories: Vec<CategoryInfo>,
        image_location: Option<String>,
    ) -> Self {
        Self {
            id: row.id,
            title: row.title.clone(),
            description: row.description.clone(),
            short_description: row.short_description.clone(),
            categories,
            timestamp: row.timestamp,
            source: row.source.clone(),
            created_at: row.created_at,
            image_id: row.image_id,
            image_location,
        }
    }
}
