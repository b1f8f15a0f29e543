use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Which session store backs the screening state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    File,
    Redis,
}

impl SessionBackend {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" | "filesystem" => Ok(Self::File),
            "redis" => Ok(Self::Redis),
            other => bail!("SESSION_BACKEND must be one of memory, file, redis (got '{other}')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a value is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub session_backend: SessionBackend,
    pub session_dir: PathBuf,
    pub redis_url: Option<String>,
    pub session_ttl_secs: u64,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            session_backend: SessionBackend::Memory,
            session_dir: PathBuf::from("./sessions"),
            redis_url: None,
            session_ttl_secs: 86_400,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let session_backend = match lookup("SESSION_BACKEND") {
            Some(raw) => SessionBackend::parse(&raw)?,
            None => defaults.session_backend,
        };
        let redis_url = lookup("REDIS_URL");
        if session_backend == SessionBackend::Redis && redis_url.is_none() {
            bail!("REDIS_URL is required when SESSION_BACKEND=redis");
        }

        let max_upload_mb: usize = parse_or(&lookup, "MAX_UPLOAD_MB", 16)?;

        Ok(Config {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            session_backend,
            session_dir: lookup("SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_dir),
            redis_url,
            session_ttl_secs: parse_or(&lookup, "SESSION_TTL_SECS", defaults.session_ttl_secs)?,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
