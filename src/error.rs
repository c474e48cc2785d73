use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown token '{symbol}' referenced by {field}")]
    UnknownToken { field: &'static str, symbol: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures reported by a swap venue or balance oracle.
#[derive(Error, Debug, Clone)]
pub enum VenueError {
    #[error("rate limited by venue")]
    RateLimited,

    #[error("venue request timed out")]
    Timeout,

    #[error("venue returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("venue request failed: {0}")]
    Transport(String),

    #[error("malformed venue response: {0}")]
    Decode(String),

    #[error("venue rejected request: {0}")]
    Rejected(String),
}

impl VenueError {
    /// True for failures the quote gateway retries with backoff.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Status { status: 429, .. })
    }
}

impl From<reqwest::Error> for VenueError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        if err.status().map(|s| s.as_u16()) == Some(429) {
            return Self::RateLimited;
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Transport(err.to_string())
    }
}

/// Durable snapshot store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("snapshot io error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot encoding error for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Venue(#[from] VenueError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
