//! Pool setup and schema bootstrap. Tables are created with
//! `CREATE TABLE IF NOT EXISTS` at startup; no migration tooling is involved
//! for a single-instance mock deployment.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// The category catalog carried over from the superseded fixed-enum schema.
/// Seeded once into the dynamic `categories` table when it is empty.
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "politics",
    "technology",
    "sports",
    "entertainment",
    "business",
    "health",
    "science",
    "world",
];

pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

pub async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            location TEXT NOT NULL,
            filename TEXT NOT NULL,
            alt_text TEXT,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    // updated_at is reserved: declared for a future update path, never written.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS news (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            short_description TEXT,
            source TEXT NOT NULL,
            image_id INTEGER REFERENCES images(id),
            timestamp TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS news_categories (
            news_id INTEGER NOT NULL REFERENCES news(id) ON DELETE CASCADE,
            category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            PRIMARY KEY (news_id, category_id)
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Populate the category catalog on first boot. A non-empty table is left
/// untouched so operator-added categories survive restarts.
pub async fn seed_categories(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        return Ok(());
    }

    for name in DEFAULT_CATEGORIES {
        sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await?;
    }

    info!("Seeded {} default categories", DEFAULT_CATEGORIES.len());
    Ok(())
}
