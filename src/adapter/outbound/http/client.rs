//! Shared HTTP client construction and response mapping.

use std::time::Duration;

use reqwest::Client as HttpClient;
use tracing::warn;

use crate::error::VenueError;

/// Timeouts for the shared HTTP client.
#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

pub(crate) fn build_client(settings: HttpSettings) -> HttpClient {
    HttpClient::builder()
        .timeout(settings.timeout)
        .connect_timeout(settings.connect_timeout)
        .build()
        .unwrap_or_else(|err| {
            warn!(error = %err, "Failed to build HTTP client, using defaults");
            HttpClient::new()
        })
}

/// Map a non-success response to a [`VenueError`].
pub(crate) async fn status_error(response: reqwest::Response) -> VenueError {
    let status = response.status().as_u16();
    if status == 429 {
        return VenueError::RateLimited;
    }
    let body = response.text().await.unwrap_or_default();
    VenueError::Status {
        status,
        body: body.chars().take(512).collect(),
    }
}
