use sqlx::SqlitePool;

use crate::utils::config::Config;

pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Config,
}
