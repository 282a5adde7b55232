//! Blocking HTTP GET on top of the async reqwest client.
//!
//! Uses async reqwest internally, driven by a shared tokio runtime,
//! but presents a sync interface for the sequential sync loop.

use std::sync::LazyLock;
use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error types for fetch operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Server answered with a non-2xx status
    Status { code: u16, reason: String },
    /// Request never produced a status (connect, timeout, body read)
    Transport(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { code, reason } if reason.is_empty() => write!(f, "{code}"),
            Self::Status { code, reason } => write!(f, "{code} {reason}"),
            Self::Transport(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Build from a non-success status, using the canonical reason phrase.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        Self::Status {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    /// Create transport error from reqwest error.
    ///
    /// The URL is dropped: request URLs carry the API key.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return Self::from_status(status);
        }
        Self::Transport(e.without_url().to_string())
    }

    /// HTTP status code, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::Transport(_) => None,
        }
    }
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// HTTP GET → body text. Any non-2xx status is an error.
pub fn get_text(url: &str, timeout: Duration) -> Result<String, FetchError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = SHARED_CLIENT
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status));
        }

        response.text().await.map_err(FetchError::from_reqwest)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_status_with_reason() {
        let err = FetchError::from_status(reqwest::StatusCode::FORBIDDEN);
        assert_eq!(format!("{err}"), "403 Forbidden");
    }

    #[test]
    fn display_status_internal_error() {
        let err = FetchError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(format!("{err}"), "500 Internal Server Error");
    }

    #[test]
    fn display_status_without_reason() {
        let err = FetchError::Status {
            code: 599,
            reason: String::new(),
        };
        assert_eq!(format!("{err}"), "599");
    }

    #[test]
    fn display_transport() {
        let err = FetchError::Transport("connection refused".to_string());
        assert_eq!(format!("{err}"), "connection refused");
    }

    #[test]
    fn status_code_accessor() {
        assert_eq!(
            FetchError::from_status(reqwest::StatusCode::NOT_FOUND).status(),
            Some(404)
        );
        assert_eq!(FetchError::Transport("timeout".into()).status(), None);
    }
}
