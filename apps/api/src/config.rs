use anyhow::{Context, Result};

/// S3 / MinIO settings; present only when `S3_BUCKET` is set.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Without `DATABASE_URL` the service runs on the in-memory store, and
/// without `S3_BUCKET` uploads stay in memory.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub s3: Option<S3Config>,
    pub port: u16,
    pub rust_log: String,
    pub writer_share_percent: u8,
    pub session_ttl_hours: i64,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            s3: None,
            port: 8080,
            rust_log: "info".to_string(),
            writer_share_percent: 70,
            session_ttl_hours: 24,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        let s3 = match optional_env("S3_BUCKET") {
            Some(bucket) => Some(S3Config {
                bucket,
                endpoint: require_env("S3_ENDPOINT")?,
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            }),
            None => None,
        };

        let writer_share_percent = check_share_percent(parse_env(
            "WRITER_SHARE_PERCENT",
            defaults.writer_share_percent,
        )?)?;

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            s3,
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            writer_share_percent,
            session_ttl_hours: parse_env("SESSION_TTL_HOURS", defaults.session_ttl_hours)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        })
    }
}

/// A writer always earns something and never more than the price.
fn check_share_percent(percent: u8) -> Result<u8> {
    if !(1..=100).contains(&percent) {
        anyhow::bail!("WRITER_SHARE_PERCENT must be between 1 and 100, got {percent}");
    }
    Ok(percent)
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid value, got '{raw}'")),
        None => Ok(default),
    }
}
