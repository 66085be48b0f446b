use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub pgn_storage_base_url: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set"),
            pgn_storage_base_url: env::var("PGN_STORAGE_BASE_URL").unwrap_or_else(|_| {
                "https://clubchess-pgn-files.s3.eu-north-1.amazonaws.com".to_string()
            }),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        }
    }
}
