use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Category projection. The wire contract uses `category_id`/`category_name`
/// regardless of the column names, so the rename is load-bearing.
#[derive(FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    #[serde(rename = "category_id")]
    pub id: i64,
    #[serde(rename = "category_name")]
    pub name: String,
}
