//! Environment variable parsing utilities
//!
//! A variable that is absent falls back to its default; a variable that is
//! present but unparsable is an error, so a typo in deployment config fails
//! startup instead of silently running with a default.

use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("Environment variable {0} not set")]
    Missing(String),
    #[error("Environment variable {key} has invalid value {value:?}")]
    Invalid { key: String, value: String },
}

fn read(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse<T: FromStr>(key: &str, raw: String) -> Result<T, EnvError> {
    raw.trim().parse().map_err(|_| EnvError::Invalid {
        key: key.to_string(),
        value: raw,
    })
}

/// Parse an environment variable, using `default` when it is unset or blank
///
/// # Example
/// ```ignore
/// let port: u16 = env_or("API_PORT", 8080)?;
/// ```
pub fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, EnvError> {
    match read(key) {
        Some(raw) => parse(key, raw),
        None => Ok(default),
    }
}

/// Parse a required environment variable
///
/// # Example
/// ```ignore
/// let database_url: String = env_required("DATABASE_URL")?;
/// ```
pub fn env_required<T: FromStr>(key: &str) -> Result<T, EnvError> {
    let raw = read(key).ok_or_else(|| EnvError::Missing(key.to_string()))?;
    parse(key, raw)
}

/// Parse a boolean flag; accepts `1/0`, `true/false`, `yes/no`, `on/off`
pub fn env_flag(key: &str, default: bool) -> Result<bool, EnvError> {
    let Some(raw) = read(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(EnvError::Invalid {
            key: key.to_string(),
            value: raw,
        }),
    }
}
