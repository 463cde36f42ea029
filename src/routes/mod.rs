pub mod categories;
pub mod images;
pub mod news;

use std::error::Error;
use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use http::StatusCode;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Registry};

pub use categories::category_routes;
pub use images::image_routes;
pub use news::news_routes;

use crate::{
    db,
    handlers,
    utils::{config::Config, state::AppState},
};

pub fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let level = match log_level.as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let filter = filter::Targets::new()
        .with_target("tower_http::trace::on_response", Level::TRACE)
        .with_target("tower_http::trace::on_request", Level::TRACE)
        .with_target("tower_http::trace::make_span", Level::DEBUG)
        .with_target("axum::rejection", Level::TRACE)
        .with_target(env!("CARGO_CRATE_NAME"), level)
        .with_default(Level::INFO);

    let tracing_layer = tracing_subscriber::fmt::layer();

    Registry::default().with(tracing_layer).with(filter).init();
}

pub async fn make_app(config: Config) -> Result<Router, Box<dyn Error>> {
    info!("Initializing application...");

    tokio::fs::create_dir_all(&config.image_dir).await?;

    let db_pool = db::connect(&config.database_url).await?;
    info!("Database connection pool created successfully");

    db::create_tables(&db_pool).await?;
    db::seed_categories(&db_pool).await?;
    info!("Database tables ready");

    let state = Arc::new(AppState { db_pool, config });
    info!("Application initialized successfully");

    Ok(router(state))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/news", news_routes())
        .nest("/api/categories", category_routes())
        .nest("/api/images", image_routes())
        // The documented surface uses trailing slashes on the collection
        // roots; nested routers only match the bare path.
        .route("/api/news/", axum::routing::post(handlers::news::create_news))
        .route(
            "/api/categories/",
            get(handlers::categories::get_all_categories),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to News API Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "news": {
                "create_news": "POST /api/news/",
                "news_by_id": "GET /api/news/{news_id}",
                "newest_titles": "GET /api/news/newest/titles",
                "newest_full": "GET /api/news/newest/full",
                "titles_by_category": "GET /api/news/by-category/{category_id}/titles",
                "full_by_category": "GET /api/news/by-category/{category_id}/full",
                "titles_by_multiple_categories": "POST /api/news/by-multiple-categories/titles",
                "search": "GET /api/news/search",
            },
            "categories": {
                "all_categories": "GET /api/categories/",
            },
            "images": {
                "upload": "POST /api/images/upload",
                "by_filename": "GET /api/images/{filename}",
                "by_id": "GET /api/images/by-id/{image_id}",
                "info": "GET /api/images/info/{image_id}",
            },
            "health": "/health",
        },
    }))
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(&state.db_pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({"status": "healthy", "database": "connected"})),
        ),
        Err(err) => {
            error!("Health check failed: {err}");
            (
                StatusCode::OK,
                Json(json!({
                    "status": "unhealthy",
                    "database": "disconnected",
                    "error": err.to_string(),
                })),
            )
        }
    }
}
