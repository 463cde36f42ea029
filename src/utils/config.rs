use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub image_dir: PathBuf,
    pub port: u16,
}

impl Config {
    pub fn init() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./news_api.db?mode=rwc".to_string());
        let image_dir = std::env::var("IMAGE_STORAGE_LOCATION")
            .unwrap_or_else(|_| "./images".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Config {
            database_url,
            image_dir: PathBuf::from(image_dir),
            port,
        }
    }
}
