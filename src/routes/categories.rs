use std::sync::Arc;

use axum::{routing::get, Router};

use crate::{handlers::categories::get_all_categories, utils::state::AppState};

pub fn category_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_all_categories))
}
