//! Error types for GitHub API operations

use thiserror::Error;

/// Errors returned by the GitHub client
///
/// The variants split into two families that callers are expected to
/// distinguish:
///
/// - **API-level**: [`NotFound`](ApiError::NotFound),
///   [`TooLarge`](ApiError::TooLarge) and [`Api`](ApiError::Api) mean the
///   remote API answered with a well-formed error payload.
/// - **Transport-level**: [`Http`](ApiError::Http) and
///   [`Network`](ApiError::Network) mean the request itself failed (401,
///   5xx, connection errors). These are never folded into the API-level
///   variants.
#[derive(Debug, Error)]
pub enum ApiError {
    // ============ API-Level Errors ============
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The direct contents endpoint refused the file because of its size.
    /// Recoverable: content resolution retries once via the git blob path.
    #[error("File too large for the contents endpoint")]
    TooLarge,

    #[error("GitHub API error: {message}")]
    Api { message: String },

    // ============ Transport-Level Errors ============
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Network error: {message}")]
    Network { message: String },

    // ============ Cache Errors ============
    #[error("Cache error: {message}")]
    Cache { message: String },

    // ============ Payload Errors ============
    #[error("Could not decode response payload: {message}")]
    Decode { message: String },

    // ============ Configuration Errors ============
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

/// Result type for GitHub client operations
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            ApiError::Http {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            ApiError::Network {
                message: e.to_string(),
            }
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        ApiError::Cache {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode {
            message: e.to_string(),
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::Config {
            message: format!("Invalid URL: {}", e),
        }
    }
}

impl ApiError {
    /// True for errors the remote API reported, as opposed to failures of
    /// the request itself.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound { .. } | ApiError::TooLarge | ApiError::Api { .. }
        )
    }
}
