//! Client configuration
//!
//! All process-wide defaults (user agent, token, cache name) are resolved
//! once at construction time via [`ClientConfig::from_env`]. The rest of the
//! library never reads the environment.

use std::time::Duration;

/// Default API origin
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default cache database name
pub const DEFAULT_CACHE_NAME: &str = "http_cache";

/// Configuration for a [`GithubClient`](crate::GithubClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base API origin
    pub base_url: String,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Personal access token, sent as `Authorization: token <t>` when set
    pub token: Option<String>,

    /// Response cache settings; `None` disables caching entirely
    pub cache: Option<CacheConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: String::new(),
            token: None,
            cache: None,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from the process environment.
    ///
    /// Reads `GITHUB_TOKEN`, `GITHUB_USER_AGENT` and `HUBVIEW_CACHE_NAME`.
    /// Setting `HUBVIEW_CACHE_NAME` enables caching under that database
    /// name; otherwise caching stays disabled unless
    /// [`with_cache`](Self::with_cache) is called afterwards.
    pub fn from_env() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: std::env::var("GITHUB_USER_AGENT").unwrap_or_default(),
            token: std::env::var("GITHUB_TOKEN").ok(),
            cache: std::env::var("HUBVIEW_CACHE_NAME").ok().map(CacheConfig::named),
        }
    }

    /// Enable response caching with the given settings
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Override the API origin (useful for GitHub Enterprise or tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set an explicit token, taking precedence over the environment
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Settings for the URL-keyed response cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Database name; the cache lives at `<cache_dir>/hubview/<name>.db`
    pub name: String,

    /// Global expiry for cached responses; `None` means entries never expire
    pub expire_after: Option<Duration>,

    /// Per-URL expiry overrides: the first pattern contained in a request
    /// URL wins, otherwise the global expiry applies
    pub urls_expire_after: Vec<(String, Option<Duration>)>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CACHE_NAME.to_string(),
            expire_after: None,
            urls_expire_after: Vec::new(),
        }
    }
}

impl CacheConfig {
    /// Cache settings with a custom database name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Resolve the expiry for a request URL
    pub fn expiry_for(&self, url: &str) -> Option<Duration> {
        self.urls_expire_after
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, expiry)| *expiry)
            .unwrap_or(self.expire_after)
    }
}
