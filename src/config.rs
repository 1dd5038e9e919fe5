use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TMDB_BASE: &str = "https://api.themoviedb.org/3";
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";
const DEFAULT_BIND: &str = "0.0.0.0:3146";
const DEFAULT_PREFS_PATH: &str = "data/preferences.json";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TMDB API key is not configured. Please add TMDB_API_KEY to your .env file.")]
    MissingApiKey,
    #[error("TMDB API key is still the placeholder value. Please set a real TMDB_API_KEY.")]
    PlaceholderApiKey,
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime settings read from the process environment.
///
/// A bad API key does not stop startup; the error is carried in `api_key`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Result<String, ConfigError>,
    pub tmdb_base: String,
    pub bind: SocketAddr,
    pub prefs_path: PathBuf,
    pub http_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = validate_api_key(lookup("TMDB_API_KEY").as_deref());
        let tmdb_base = lookup("TMDB_BASE_URL")
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_TMDB_BASE.to_string());

        let bind_raw = lookup("CINESCOUT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "CINESCOUT_BIND",
                value: bind_raw.clone(),
            })?;

        let prefs_path = lookup("CINESCOUT_PREFS_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PREFS_PATH));

        let http_timeout = match lookup("CINESCOUT_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "CINESCOUT_HTTP_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_key,
            tmdb_base,
            bind,
            prefs_path,
            http_timeout,
        })
    }
}

pub fn validate_api_key(raw: Option<&str>) -> Result<String, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Err(ConfigError::MissingApiKey),
        Some(PLACEHOLDER_API_KEY) => Err(ConfigError::PlaceholderApiKey),
        Some(key) => Ok(key.to_string()),
    }
}
