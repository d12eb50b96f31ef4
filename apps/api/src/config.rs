use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 60 * 60;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    /// Editor sessions untouched for this long are dropped.
    pub session_idle_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            session_idle_ttl: Duration::from_secs(parse_env(
                "SESSION_IDLE_TTL_SECS",
                DEFAULT_SESSION_IDLE_TTL_SECS,
            )?),
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/vitae_test".into(),
            database_max_connections: 1,
            anthropic_api_key: "test-key".into(),
            port: 0,
            rust_log: "debug".into(),
            max_upload_bytes: 1024,
            session_idle_ttl: Duration::from_secs(60),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        assert_eq!(parse_env("VITAE_TEST_UNSET_VARIABLE", 42u32).unwrap(), 42);
    }
}
