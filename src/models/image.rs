use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

#[derive(FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct ImageRow {
    pub id: i64,
    pub location: String,
    pub filename: String,
    pub alt_text: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
