//! Error types for deltafeed
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for deltafeed
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Fetch Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport failure: {message}")]
    Transport { message: String },

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("HTTP {status} returned an empty body")]
    EmptyResponse { status: u16 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Request to {url} rejected with HTTP {status}")]
    ClientStatus { status: u16, url: String },

    #[error("Giving up on {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Cancelled while fetching {url}")]
    Cancelled { url: String },

    // ============================================================================
    // Parse Errors
    // ============================================================================
    #[error("XML parsing error: {message}")]
    XmlParse { message: String },

    // ============================================================================
    // Stream Errors
    // ============================================================================
    #[error("Stream exhausted: no continuation after {last_url}")]
    StreamExhausted { last_url: String },

    #[error("Empty page at {url} points back to itself")]
    ContinuationLoop { url: String },

    #[error("Received {count} consecutive empty pages, last from {url}")]
    TooManyEmptyPages { count: u32, url: String },
}

impl Error {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an XML parse error
    pub fn xml(message: impl Into<String>) -> Self {
        Self::XmlParse {
            message: message.into(),
        }
    }

    /// Check if this error is worth another attempt against the same URL
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => !e.is_builder() && !e.is_redirect(),
            Error::Transport { .. } | Error::Timeout { .. } | Error::EmptyResponse { .. } => true,
            Error::HttpStatus { status, .. } => !(400..500).contains(status),
            _ => false,
        }
    }

    /// Check if this error was raised while building configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
                | Error::JsonParse(_)
        )
    }

    /// Check if this error ended a fetch
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::Transport { .. }
                | Error::HttpStatus { .. }
                | Error::EmptyResponse { .. }
                | Error::Timeout { .. }
                | Error::ClientStatus { .. }
                | Error::RetriesExhausted { .. }
                | Error::InvalidUrl(_)
                | Error::Cancelled { .. }
        )
    }

    /// Check if this error marks the clean end of a stream
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::StreamExhausted { .. })
    }
}

/// Result type alias for deltafeed
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::missing_field("vendor");
        assert_eq!(err.to_string(), "Missing required config field: vendor");

        let err = Error::http_status(503, "Service Unavailable");
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");

        let err = Error::RetriesExhausted {
            url: "http://x/rss".to_string(),
            attempts: 3,
            last_error: "HTTP 500: ".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Giving up on http://x/rss after 3 attempts: HTTP 500: "
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::transport("connection reset").is_retryable());
        assert!(Error::EmptyResponse { status: 200 }.is_retryable());
        assert!(Error::http_status(500, "").is_retryable());
        assert!(Error::http_status(503, "").is_retryable());

        assert!(!Error::http_status(400, "").is_retryable());
        assert!(!Error::http_status(429, "").is_retryable());
        assert!(!Error::ClientStatus {
            status: 403,
            url: String::new()
        }
        .is_retryable());
        assert!(!Error::missing_field("api").is_retryable());
        assert!(!Error::xml("bad").is_retryable());
    }

    #[test]
    fn test_classification() {
        assert!(Error::missing_field("api").is_config_error());
        assert!(Error::invalid_value("retries", "negative").is_config_error());
        assert!(!Error::missing_field("api").is_fetch_error());

        assert!(Error::Cancelled { url: String::new() }.is_fetch_error());
        assert!(Error::RetriesExhausted {
            url: String::new(),
            attempts: 1,
            last_error: String::new()
        }
        .is_fetch_error());
        assert!(!Error::xml("bad").is_fetch_error());

        assert!(Error::StreamExhausted {
            last_url: String::new()
        }
        .is_exhausted());
        assert!(!Error::ContinuationLoop { url: String::new() }.is_exhausted());
    }
}
