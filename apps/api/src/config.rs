use anyhow::{ensure, Context, Result};

use crate::assessment::chunker::{DEFAULT_STRIDE, DEFAULT_WINDOW};
use crate::assessment::pipeline::CountSource;
use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub port: u16,
    pub rust_log: String,
    pub chunk_window: usize,
    pub chunk_stride: usize,
    pub max_upload_bytes: usize,
    pub count_source: CountSource,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_model: env_or("OPENAI_MODEL", DEFAULT_MODEL),
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
            chunk_window: parse_env("CHUNK_WINDOW", DEFAULT_WINDOW)?,
            chunk_stride: parse_env("CHUNK_STRIDE", DEFAULT_STRIDE)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            count_source: std::env::var("COUNT_SOURCE")
                .ok()
                .map(|v| v.parse::<CountSource>())
                .transpose()
                .map_err(anyhow::Error::msg)
                .context("COUNT_SOURCE is invalid")?
                .unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.chunk_stride > 0 && self.chunk_stride < self.chunk_window,
            "CHUNK_STRIDE ({}) must be greater than 0 and less than CHUNK_WINDOW ({})",
            self.chunk_stride,
            self.chunk_window
        );
        ensure!(self.max_upload_bytes > 0, "MAX_UPLOAD_BYTES must be positive");
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
