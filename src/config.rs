use anyhow::Result;
use dotenvy::dotenv;

const DEFAULT_PORT: u16 = 3000;

fn default_max_upload_bytes() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let port = match std::env::var("PORT") {
            Ok(value) => value
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT: {}", e))?,
            Err(_) => DEFAULT_PORT,
        };

        let max_upload_bytes = match std::env::var("MAX_UPLOAD_BYTES") {
            Ok(value) => value
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_UPLOAD_BYTES: {}", e))?,
            Err(_) => default_max_upload_bytes(),
        };

        Ok(Config {
            port,
            max_upload_bytes,
        })
    }
}
