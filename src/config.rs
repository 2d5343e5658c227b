//! Client configuration
//!
//! [`ClientOptions`] is the loosely typed construction surface (it deserializes
//! from JSON), [`ClientConfig`] is the validated, immutable configuration a
//! client runs with. Both paths end in [`ClientConfig::validate`], so a client
//! can never be built without a method name and a vendor key.

use crate::error::{Error, Result};
use crate::types::{BackoffType, JsonValue, QueryEncoding, StringMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

// ============================================================================
// Defaults
// ============================================================================

/// Production endpoint of the delta API
pub const DEFAULT_BASE_URL: &str = "http://api.spinn3r.com/rss";

/// API version sent when the caller does not pick one
pub const DEFAULT_API_VERSION: &str = "2.1.3";

/// Attempts per fetch
pub const DEFAULT_RETRIES: u32 = 5;

/// Sleep between fetch attempts
pub const DEFAULT_RETRY_SLEEP: Duration = Duration::from_secs(30);

/// Transport connect/read timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Channel element carrying the continuation URL
pub const DEFAULT_CONTINUATION_ELEMENT: &str = "api:next_request";

/// Element wrapping a single item
pub const DEFAULT_ITEM_ELEMENT: &str = "item";

/// Consecutive empty pages tolerated before giving up
pub const DEFAULT_MAX_EMPTY_PAGES: u32 = 25;

/// Query parameter holding the vendor key
pub const VENDOR_PARAM: &str = "vendor";

/// Query parameter holding the API version
pub const VERSION_PARAM: &str = "version";

// ============================================================================
// Fetch Policy
// ============================================================================

/// Retry and transport settings for the fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Attempts per fetch (0 is treated as 1)
    pub retries: u32,
    /// Base delay between attempts
    pub retry_sleep: Duration,
    /// How the delay grows between attempts
    pub backoff: BackoffType,
    /// Upper bound for a single delay
    pub max_sleep: Duration,
    /// Transport connect/read timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            retry_sleep: DEFAULT_RETRY_SLEEP,
            backoff: BackoffType::Constant,
            max_sleep: Duration::from_secs(300),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("deltafeed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchPolicy {
    /// Number of attempts a fetch may make
    pub fn attempts(&self) -> u32 {
        self.retries.max(1)
    }

    /// Delay before the retry that follows attempt number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            BackoffType::Constant => self.retry_sleep,
            BackoffType::Linear => self.retry_sleep.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => self
                .retry_sleep
                .saturating_mul(2u32.saturating_pow(attempt)),
        };

        std::cmp::min(delay, self.max_sleep)
    }
}

// ============================================================================
// Pagination Policy
// ============================================================================

/// Settings for page parsing and the empty-page guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationPolicy {
    /// Qualified name of the channel element holding the next page URL
    pub continuation_element: String,
    /// Qualified name of the item element
    pub item_element: String,
    /// Consecutive empty pages tolerated, `None` disables the limit
    pub max_empty_pages: Option<u32>,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            continuation_element: DEFAULT_CONTINUATION_ELEMENT.to_string(),
            item_element: DEFAULT_ITEM_ELEMENT.to_string(),
            max_empty_pages: Some(DEFAULT_MAX_EMPTY_PAGES),
        }
    }
}

// ============================================================================
// Client Config
// ============================================================================

/// Validated configuration for a single client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Endpoint the method name is appended to
    pub base_url: String,
    /// API method, e.g. `permalink.getDelta`
    pub method: String,
    /// API version tag
    pub version: String,
    /// Extra query parameters, vendor key included
    pub params: StringMap,
    /// How parameters are written into the URL
    pub encoding: QueryEncoding,
    /// Fetcher settings
    pub fetch: FetchPolicy,
    /// Paginator settings
    pub pagination: PaginationPolicy,
    /// Raise fetch tracing to `info`
    pub debug: bool,
}

impl ClientConfig {
    /// Start a builder for the given API method
    pub fn builder(method: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(method)
    }

    /// The vendor key, if present
    pub fn vendor(&self) -> Option<&str> {
        self.params.get(VENDOR_PARAM).map(String::as_str)
    }

    /// Check required fields and value shapes
    pub fn validate(&self) -> Result<()> {
        if self.method.trim().is_empty() {
            return Err(Error::missing_field("api"));
        }
        if self.vendor().map_or(true, |v| v.trim().is_empty()) {
            return Err(Error::missing_field("parameters.vendor"));
        }
        if self.version.trim().is_empty() {
            return Err(Error::invalid_value(VERSION_PARAM, "must not be empty"));
        }
        if self.params.contains_key(VERSION_PARAM) {
            return Err(Error::invalid_value(
                "parameters.version",
                "version belongs in ClientConfig::version",
            ));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        if self.pagination.continuation_element.is_empty() {
            return Err(Error::invalid_value(
                "continuation_element",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    fn new(method: impl Into<String>) -> Self {
        Self {
            config: ClientConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                method: method.into(),
                version: DEFAULT_API_VERSION.to_string(),
                params: StringMap::new(),
                encoding: QueryEncoding::default(),
                fetch: FetchPolicy::default(),
                pagination: PaginationPolicy::default(),
                debug: false,
            },
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the API version
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    /// Set the vendor key
    #[must_use]
    pub fn vendor(self, vendor: impl Into<String>) -> Self {
        self.param(VENDOR_PARAM, vendor)
    }

    /// Add an extra query parameter. A `version` parameter overrides the API version.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.params.insert(key.into(), value.into());
        self
    }

    /// Set the number of attempts per fetch
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.fetch.retries = retries;
        self
    }

    /// Set the delay between attempts
    #[must_use]
    pub fn retry_sleep(mut self, sleep: Duration) -> Self {
        self.config.fetch.retry_sleep = sleep;
        self
    }

    /// Set backoff shape and cap
    #[must_use]
    pub fn backoff(mut self, backoff: BackoffType, max_sleep: Duration) -> Self {
        self.config.fetch.backoff = backoff;
        self.config.fetch.max_sleep = max_sleep;
        self
    }

    /// Set the transport timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch.timeout = timeout;
        self
    }

    /// Set user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.fetch.user_agent = agent.into();
        self
    }

    /// Set query encoding
    #[must_use]
    pub fn encoding(mut self, encoding: QueryEncoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    /// Set the continuation element name
    #[must_use]
    pub fn continuation_element(mut self, element: impl Into<String>) -> Self {
        self.config.pagination.continuation_element = element.into();
        self
    }

    /// Set the item element name
    #[must_use]
    pub fn item_element(mut self, element: impl Into<String>) -> Self {
        self.config.pagination.item_element = element.into();
        self
    }

    /// Set the empty page limit (`None` disables it)
    #[must_use]
    pub fn max_empty_pages(mut self, limit: Option<u32>) -> Self {
        self.config.pagination.max_empty_pages = limit;
        self
    }

    /// Toggle verbose fetch tracing
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Promote a `version` parameter and validate
    pub fn build(mut self) -> Result<ClientConfig> {
        if let Some(version) = self.config.params.remove(VERSION_PARAM) {
            self.config.version = version;
        }
        self.config.validate()?;
        Ok(self.config)
    }
}

// ============================================================================
// Client Options
// ============================================================================

/// Construction options as accepted from callers or JSON
///
/// ```json
/// {
///   "api": "permalink.getDelta",
///   "parameters": { "vendor": "acme", "limit": 10, "version": "2.1.3" },
///   "retries": 5,
///   "retry_sleep": 30
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// API method name (required)
    #[serde(alias = "method")]
    pub api: Option<String>,
    /// Query parameters; `vendor` is required, `version` overrides the API version
    pub parameters: BTreeMap<String, JsonValue>,
    /// Attempts per fetch
    pub retries: Option<u32>,
    /// Seconds between attempts
    pub retry_sleep: Option<u64>,
    /// Transport timeout in seconds
    pub timeout: Option<u64>,
    /// Endpoint override
    pub base_url: Option<String>,
    /// Verbose fetch tracing
    pub debug: bool,
    /// Consecutive empty pages tolerated
    pub max_empty_pages: Option<u32>,
    /// Query encoding
    pub encoding: QueryEncoding,
    /// Continuation element override
    pub continuation_element: Option<String>,
}

impl ClientOptions {
    /// Parse options from a JSON value
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Convert into a validated [`ClientConfig`]
    pub fn into_config(self) -> Result<ClientConfig> {
        let api = self
            .api
            .filter(|api| !api.trim().is_empty())
            .ok_or_else(|| Error::missing_field("api"))?;

        let mut builder = ClientConfig::builder(api)
            .encoding(self.encoding)
            .debug(self.debug);

        for (key, value) in &self.parameters {
            builder = builder.param(key, scalar_to_string(key, value)?);
        }
        if let Some(retries) = self.retries {
            builder = builder.retries(retries);
        }
        if let Some(secs) = self.retry_sleep {
            builder = builder.retry_sleep(Duration::from_secs(secs));
        }
        if let Some(secs) = self.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(base_url) = self.base_url {
            builder = builder.base_url(base_url);
        }
        if let Some(limit) = self.max_empty_pages {
            builder = builder.max_empty_pages(Some(limit));
        }
        if let Some(element) = self.continuation_element {
            builder = builder.continuation_element(element);
        }

        builder.build()
    }
}

/// Render a scalar parameter value as query text
fn scalar_to_string(key: &str, value: &JsonValue) -> Result<String> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => Err(
            Error::invalid_value(format!("parameters.{key}"), "expected a string or scalar"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_fetch_policy_default() {
        let policy = FetchPolicy::default();
        assert_eq!(policy.retries, 5);
        assert_eq!(policy.retry_sleep, Duration::from_secs(30));
        assert_eq!(policy.timeout, Duration::from_secs(30));
        assert_eq!(policy.backoff, BackoffType::Constant);
        assert!(policy.user_agent.starts_with("deltafeed/"));
    }

    #[test]
    fn test_fetch_policy_attempts_minimum_one() {
        let policy = FetchPolicy {
            retries: 0,
            ..FetchPolicy::default()
        };
        assert_eq!(policy.attempts(), 1);
    }

    #[test_case(BackoffType::Constant, 0, 10; "constant first")]
    #[test_case(BackoffType::Constant, 4, 10; "constant later")]
    #[test_case(BackoffType::Linear, 2, 30; "linear")]
    #[test_case(BackoffType::Exponential, 3, 80; "exponential")]
    #[test_case(BackoffType::Exponential, 10, 100; "exponential capped")]
    fn test_delay_for(backoff: BackoffType, attempt: u32, expected_secs: u64) {
        let policy = FetchPolicy {
            retry_sleep: Duration::from_secs(10),
            backoff,
            max_sleep: Duration::from_secs(100),
            ..FetchPolicy::default()
        };
        assert_eq!(policy.delay_for(attempt), Duration::from_secs(expected_secs));
    }

    #[test]
    fn test_builder_defaults() {
        let config = ClientConfig::builder("permalink.getDelta")
            .vendor("acme")
            .build()
            .unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.version, DEFAULT_API_VERSION);
        assert_eq!(config.vendor(), Some("acme"));
        assert_eq!(config.encoding, QueryEncoding::Raw);
        assert_eq!(config.pagination, PaginationPolicy::default());
        assert!(!config.debug);
    }

    #[test]
    fn test_builder_promotes_version_param() {
        let config = ClientConfig::builder("feed.getDelta")
            .vendor("acme")
            .version("1.0")
            .param("version", "3.0.1")
            .build()
            .unwrap();

        assert_eq!(config.version, "3.0.1");
        assert!(!config.params.contains_key("version"));
    }

    #[test]
    fn test_builder_requires_method() {
        let err = ClientConfig::builder("  ").vendor("acme").build().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "api"));
    }

    #[test]
    fn test_builder_requires_vendor() {
        let err = ClientConfig::builder("permalink.getDelta")
            .param("limit", "10")
            .build()
            .unwrap_err();
        assert!(
            matches!(err, Error::MissingConfigField { ref field } if field == "parameters.vendor")
        );

        let err = ClientConfig::builder("permalink.getDelta")
            .vendor("")
            .build()
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_builder_rejects_bad_base_url() {
        let err = ClientConfig::builder("permalink.getDelta")
            .vendor("acme")
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "base_url"));
    }

    #[test]
    fn test_options_from_json() {
        let options = ClientOptions::from_json(&json!({
            "method": "permalink.getDelta",
            "parameters": {"vendor": "acme", "limit": 10, "lang": "en", "version": "2.2.0"},
            "retries": 3,
            "retry_sleep": 1,
            "debug": true,
            "encoding": "percent"
        }))
        .unwrap();

        let config = options.into_config().unwrap();
        assert_eq!(config.method, "permalink.getDelta");
        assert_eq!(config.version, "2.2.0");
        assert_eq!(config.params.get("limit"), Some(&"10".to_string()));
        assert_eq!(config.params.get("lang"), Some(&"en".to_string()));
        assert_eq!(config.fetch.retries, 3);
        assert_eq!(config.fetch.retry_sleep, Duration::from_secs(1));
        assert_eq!(config.encoding, QueryEncoding::Percent);
        assert!(config.debug);
    }

    #[test]
    fn test_options_missing_api() {
        let options = ClientOptions::from_json(&json!({
            "parameters": {"vendor": "acme"}
        }))
        .unwrap();
        let err = options.into_config().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "api"));
    }

    #[test]
    fn test_options_missing_vendor() {
        let options = ClientOptions {
            api: Some("permalink.getDelta".to_string()),
            ..ClientOptions::default()
        };
        assert!(options.into_config().unwrap_err().is_config_error());
    }

    #[test]
    fn test_options_rejects_nested_parameter() {
        let options = ClientOptions::from_json(&json!({
            "api": "permalink.getDelta",
            "parameters": {"vendor": "acme", "filter": {"lang": "en"}}
        }))
        .unwrap();
        let err = options.into_config().unwrap_err();
        assert!(
            matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "parameters.filter")
        );
    }
}
