use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Supabase backend
    pub supabase_url: String,
    pub supabase_anon_key: String,

    // Storage buckets
    pub thread_images_bucket: String,
    pub avatars_bucket: String,

    // HTTP client
    pub request_timeout: Duration,

    // Feed reconciler timing
    pub search_debounce: Duration,
    pub fetch_abort_after: Duration,
    pub loading_clear_after: Duration,

    // Session
    pub session_init_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            supabase_url: required_env("SUPABASE_URL")?,
            supabase_anon_key: required_env("SUPABASE_ANON_KEY")?,

            thread_images_bucket: env_or_default("THREAD_IMAGES_BUCKET", "thread-images"),
            avatars_bucket: env_or_default("AVATARS_BUCKET", "avatars"),

            request_timeout: Duration::from_secs(parse_env_u64("REQUEST_TIMEOUT_SECS", 30)?),

            search_debounce: Duration::from_millis(parse_env_u64("SEARCH_DEBOUNCE_MS", 300)?),
            fetch_abort_after: Duration::from_millis(parse_env_u64("FETCH_ABORT_AFTER_MS", 7000)?),
            loading_clear_after: Duration::from_millis(parse_env_u64(
                "LOADING_CLEAR_AFTER_MS",
                8000,
            )?),

            session_init_timeout: Duration::from_millis(parse_env_u64(
                "SESSION_INIT_TIMEOUT_MS",
                5000,
            )?),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.supabase_url).is_err() {
            return Err(ConfigError::InvalidValue {
                name: "SUPABASE_URL".to_string(),
                message: format!("not a valid URL: '{}'", self.supabase_url),
            });
        }
        if self.supabase_anon_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "SUPABASE_ANON_KEY".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.fetch_abort_after <= self.search_debounce {
            return Err(ConfigError::InvalidValue {
                name: "FETCH_ABORT_AFTER_MS".to_string(),
                message: "must be longer than the search debounce".to_string(),
            });
        }
        if self.loading_clear_after <= self.fetch_abort_after {
            return Err(ConfigError::InvalidValue {
                name: "LOADING_CLEAR_AFTER_MS".to_string(),
                message: "must be longer than the fetch abort window".to_string(),
            });
        }
        Ok(())
    }

    /// Configuration with sensible defaults for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            thread_images_bucket: "thread-images".to_string(),
            avatars_bucket: "avatars".to_string(),
            request_timeout: Duration::from_secs(10),
            search_debounce: Duration::from_millis(300),
            fetch_abort_after: Duration::from_millis(7000),
            loading_clear_after: Duration::from_millis(8000),
            session_init_timeout: Duration::from_millis(5000),
        }
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
