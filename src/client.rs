//! Low-level API client: URL construction and error mapping
//!
//! The client translates path segments + query parameters into a request and
//! maps the API's known error responses into [`ApiError`] variants. Anything
//! it does not recognize is passed through as a transport-level error.

use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::repository::GithubRepo;
use crate::transport::{HttpTransport, Transport};

/// A connection to the GitHub API
pub struct GithubClient {
    base: Url,
    transport: Box<dyn Transport>,
}

impl GithubClient {
    /// Create a client from configuration, building the default blocking
    /// transport (with a response cache when one is configured).
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Self::with_transport(&config.base_url, Box::new(transport))
    }

    /// Create a client over a custom transport
    pub fn with_transport(base_url: &str, transport: Box<dyn Transport>) -> Result<Self> {
        let base = Url::parse(base_url)?;
        Ok(Self { base, transport })
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Build a request URL from the base origin, path segments and query
    /// parameters
    fn build_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Config {
                message: format!("Base URL cannot have segments appended: {}", self.base),
            })?
            .pop_if_empty()
            .extend(segments.iter().filter(|s| !s.is_empty()));

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Fetch a URL built from path segments and return the JSON body.
    ///
    /// Expected API-level errors are mapped before anything else:
    /// - 404 becomes [`ApiError::NotFound`] carrying the API's message
    /// - 403 with an `errors` entry of code `too_large` becomes
    ///   [`ApiError::TooLarge`]
    /// - any other well-formed 403 becomes [`ApiError::Api`]
    ///
    /// Every other non-success status is surfaced unmapped as
    /// [`ApiError::Http`].
    pub fn get_json(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Value> {
        let url = self.build_url(segments, query)?;
        let response = self.transport.get(&url)?;

        match response.status {
            status if (200..300).contains(&status) => Ok(serde_json::from_str(&response.body)?),
            404 => Err(ApiError::NotFound {
                message: extract_message(&response.body),
            }),
            403 => Err(map_forbidden(&response.body)),
            status => Err(ApiError::Http {
                status,
                url: url.to_string(),
            }),
        }
    }

    /// Check that a repository exists and return a handle for it.
    ///
    /// `owner_and_repo` is the usual `owner/name` form. The lookup is issued
    /// purely for its error side effects; a missing repository surfaces as
    /// [`ApiError::NotFound`] here rather than on first use.
    pub fn repository(&self, owner_and_repo: &str) -> Result<GithubRepo<'_>> {
        let Some((owner, name)) = owner_and_repo.split_once('/') else {
            return Err(ApiError::Config {
                message: format!("Expected owner/name, got {:?}", owner_and_repo),
            });
        };
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(ApiError::Config {
                message: format!("Expected owner/name, got {:?}", owner_and_repo),
            });
        }

        self.get_json(&["repos", owner, name], &[])?;
        Ok(GithubRepo::new(self, owner, name))
    }
}

/// Pull the `message` field out of an error payload, falling back to the
/// raw body
fn extract_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

/// Classify a 403 response.
///
/// A `too_large` code anywhere in the `errors` array is the recoverable
/// size-ceiling signal. An `errors` array without it wraps the full payload;
/// a body without `errors` at all is reported verbatim.
fn map_forbidden(body: &str) -> ApiError {
    let Ok(payload) = serde_json::from_str::<Value>(body) else {
        return ApiError::Api {
            message: body.to_string(),
        };
    };

    match payload.get("errors").and_then(Value::as_array) {
        Some(errors) => {
            let too_large = errors
                .iter()
                .any(|e| e.get("code").and_then(Value::as_str) == Some("too_large"));
            if too_large {
                ApiError::TooLarge
            } else {
                ApiError::Api {
                    message: payload.to_string(),
                }
            }
        }
        None => ApiError::Api {
            message: body.to_string(),
        },
    }
}
