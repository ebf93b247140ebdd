use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

static LOAD_ENV: OnceLock<()> = OnceLock::new();

/// Loads environment variables from `.env` files, once per process.
///
/// Order of precedence, later files override earlier ones:
/// 1. `.env`
/// 2. `.env.dev` in debug builds, `.env.prod` in release builds
/// 3. `.env.local`
pub fn load_dotenv() {
    LOAD_ENV.get_or_init(|| {
        dotenv().ok();

        let env_file = if cfg!(debug_assertions) { ".env.dev" } else { ".env.prod" };
        for file in [env_file, ".env.local"] {
            if Path::new(file).exists() {
                dotenvy::from_filename(file).ok();
            }
        }
    });
}

/// Reads `key` and parses it into `T`, falling back to `default` when unset.
pub fn get_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Debug,
{
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|_| anyhow!("Failed to parse {} env var", key)),
        Err(_) => Ok(default),
    }
}

/// Reads a comma separated list from `key`.
pub fn get_vec_from_env_or<T>(key: &str, default: Vec<T>) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: Into<anyhow::Error>,
{
    match env::var(key) {
        Ok(val) => val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse()
                    .map_err(Into::into)
                    .context(format!("Failed to parse {} env var", key))
            })
            .collect(),
        Err(_) => Ok(default),
    }
}

/// Reads a byte size from `key`, accepting K, M, G suffixes.
pub fn get_size_from_env_or(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(val) => parse_size(&val).ok_or_else(|| anyhow!("Failed to parse {} env var", key)),
        Err(_) => Ok(default),
    }
}

/// Reads a flag from `key`. Accepts true/false, 1/0, yes/no, on/off.
pub fn get_bool_from_env_or(key: &str, default: bool) -> Result<bool> {
    match env::var(key) {
        Ok(value) => match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("Failed to parse {} env var as `bool`", key)),
        },
        Err(_) => Ok(default),
    }
}

/// Reads a duration from `key`, e.g. `250ms`, `2s`, `5m`. A bare number is milliseconds.
pub fn get_duration_from_env_or(key: &str, default: Duration) -> Result<Duration> {
    match env::var(key) {
        Ok(val) => {
            parse_duration(&val).ok_or_else(|| anyhow!("Failed to parse {} env var", key))
        }
        Err(_) => Ok(default),
    }
}

/// Converts a size string such as `2M` or `512k` to bytes.
pub fn parse_size(size_str: &str) -> Option<u64> {
    let size_str = size_str.trim().to_lowercase();
    if size_str.is_empty() {
        return None;
    }

    let (num_part, multiplier) = match size_str.chars().last() {
        Some('k') => (&size_str[..size_str.len() - 1], 1024u64),
        Some('m') => (&size_str[..size_str.len() - 1], 1024u64 * 1024),
        Some('g') => (&size_str[..size_str.len() - 1], 1024u64 * 1024 * 1024),
        _ => (size_str.as_str(), 1),
    };

    num_part.parse::<u64>().ok()?.checked_mul(multiplier)
}

/// Converts a duration string such as `500ms`, `3s` or `1m`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return None;
    }

    let (num_part, unit) = if let Some(n) = value.strip_suffix("ms") {
        (n, 1u64)
    } else if let Some(n) = value.strip_suffix('s') {
        (n, 1000)
    } else if let Some(n) = value.strip_suffix('m') {
        (n, 60 * 1000)
    } else {
        (value.as_str(), 1)
    };

    num_part
        .parse::<u64>()
        .ok()?
        .checked_mul(unit)
        .map(Duration::from_millis)
}
