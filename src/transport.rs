//! Blocking HTTP transport with optional response caching
//!
//! The transport is the seam between the client and the network: it performs
//! plain GETs and hands back status + body without interpreting either. The
//! cache sits entirely inside the transport, keyed by full request URL.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, USER_AGENT};
use url::Url;

use crate::cache::ResponseCache;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};

/// A raw HTTP response, before any API-level interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Blocking GET transport
///
/// Implementations must not interpret response bodies; mapping statuses to
/// domain errors is the client's job. The cache methods have no-op defaults
/// so uncached transports stay trivial.
pub trait Transport {
    /// Perform a GET, returning the response or a network-level failure
    fn get(&self, url: &Url) -> Result<HttpResponse>;

    /// Enumerate URLs currently held in the response cache
    fn cached_urls(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Drop a single URL from the response cache
    fn invalidate(&self, _url: &str) -> Result<()> {
        Ok(())
    }
}

/// Transport over `reqwest::blocking` with an optional SQLite response cache
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    cache: Option<ResponseCache>,
}

impl HttpTransport {
    /// Build a transport from client configuration.
    ///
    /// The Accept, User-Agent and (when a token is configured) Authorization
    /// headers are installed as defaults so every request carries them.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let cache = match &config.cache {
            Some(cache_config) => Some(ResponseCache::open(cache_config.clone())?),
            None => None,
        };
        Self::with_cache(config, cache)
    }

    /// Build a transport with an explicit cache (or none)
    pub fn with_cache(config: &ClientConfig, cache: Option<ResponseCache>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            "application/vnd.github.v3+json"
                .parse()
                .map_err(|_| ApiError::Config {
                    message: "Invalid Accept header".to_string(),
                })?,
        );
        headers.insert(
            USER_AGENT,
            config.user_agent.parse().map_err(|_| ApiError::Config {
                message: format!("Invalid user agent: {:?}", config.user_agent),
            })?,
        );
        if let Some(token) = &config.token {
            let mut value: reqwest::header::HeaderValue =
                format!("token {}", token).parse().map_err(|_| ApiError::Config {
                    message: "Invalid token".to_string(),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network {
                message: e.to_string(),
            })?;

        Ok(Self { client, cache })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse> {
        if let Some(cache) = &self.cache
            && let Some(entry) = cache.get(url.as_str())?
        {
            tracing::debug!("cache hit for {}", url);
            return Ok(HttpResponse {
                status: entry.status,
                body: entry.body,
            });
        }

        tracing::debug!("GET {}", url);
        let response = self.client.get(url.clone()).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        // Only successful responses are worth replaying from the cache.
        if status == 200
            && let Some(cache) = &self.cache
        {
            cache.put(url.as_str(), status, &body)?;
        }

        Ok(HttpResponse { status, body })
    }

    fn cached_urls(&self) -> Result<Vec<String>> {
        match &self.cache {
            Some(cache) => cache.urls(),
            None => Ok(Vec::new()),
        }
    }

    fn invalidate(&self, url: &str) -> Result<()> {
        match &self.cache {
            Some(cache) => cache.delete_url(url),
            None => Ok(()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeTransport;
    use super::*;

    #[test]
    fn test_fake_transport_records_requests() {
        let transport = FakeTransport::new().route("https://example.com/a", 200, "ok");

        let url = Url::parse("https://example.com/a").unwrap();
        let response = transport.get(&url).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "ok");
        assert_eq!(transport.requested_urls(), vec!["https://example.com/a"]);
    }

    #[test]
    fn test_fake_transport_unrouted_url_is_network_error() {
        let transport = FakeTransport::new();
        let url = Url::parse("https://example.com/missing").unwrap();
        assert!(matches!(
            transport.get(&url),
            Err(ApiError::Network { .. })
        ));
    }

    #[test]
    fn test_http_transport_rejects_invalid_user_agent() {
        let config = ClientConfig {
            user_agent: "bad\nagent".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            HttpTransport::with_cache(&config, None),
            Err(ApiError::Config { .. })
        ));
    }

    #[test]
    fn test_http_transport_builds_with_token() {
        let config = ClientConfig::default().with_token("secret");
        assert!(HttpTransport::with_cache(&config, None).is_ok());
    }
}
