use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every key has a default; malformed numeric values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub llm_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    /// Serialized decision model produced by `api train`.
    pub model_path: PathBuf,
    pub upload_dir: PathBuf,
    /// Rendered leaderboard charts land here and are served under `/static`.
    pub static_dir: PathBuf,
    pub admin_username: String,
    pub admin_password: String,
    /// Idle sessions are dropped after this many seconds.
    pub session_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: env_or("DATABASE_URL", "sqlite://database/candidates.db?mode=rwc"),
            port: parse_env("PORT", 5000)?,
            rust_log: env_or("RUST_LOG", "info"),
            llm_url: env_or("LLM_URL", "http://localhost:11434/api/generate"),
            llm_model: env_or("LLM_MODEL", "gemma3:4b"),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 30)?,
            model_path: env_or("MODEL_PATH", "model.json").into(),
            upload_dir: env_or("UPLOAD_DIR", "uploads").into(),
            static_dir: env_or("STATIC_DIR", "static").into(),
            admin_username: env_or("ADMIN_USERNAME", "admin"),
            admin_password: env_or("ADMIN_PASSWORD", "admin"),
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 86_400)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
