use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::news::{
        create_news, get_full_by_category, get_news_by_id, get_newest_full, get_newest_titles,
        get_titles_by_category, get_titles_by_multiple_categories, search_news,
    },
    utils::state::AppState,
};

pub fn news_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_news))
        .route("/newest/titles", get(get_newest_titles))
        .route("/newest/full", get(get_newest_full))
        .route("/by-category/{category_id}/titles", get(get_titles_by_category))
        .route("/by-category/{category_id}/full", get(get_full_by_category))
        .route(
            "/by-multiple-categories/titles",
            post(get_titles_by_multiple_categories),
        )
        .route("/search", get(search_news))
        .route("/{news_id}", get(get_news_by_id))
}
