use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Without a database the service keeps everything in memory.
    pub database_url: Option<String>,
    pub api_keys: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub ollama_timeout_secs: u64,
    pub clarifier_prompt_path: Option<PathBuf>,
    pub total_rounds: u8,
    pub store_retry_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: optional("DATABASE_URL"),
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            ollama_url: optional("OLLAMA_URL")
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            ollama_model: optional("OLLAMA_MODEL").unwrap_or_else(|| "qwen2.5:7b".to_string()),
            ollama_timeout_secs: parse_or("OLLAMA_TIMEOUT_SECS", 60)?,
            clarifier_prompt_path: optional("CLARIFIER_PROMPT_PATH").map(PathBuf::from),
            total_rounds: parse_or("TOTAL_ROUNDS", engine::models::DEFAULT_TOTAL_ROUNDS)?,
            store_retry_attempts: parse_or("STORE_RETRY_ATTEMPTS", 3)?,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number", key)),
        None => Ok(default),
    }
}
