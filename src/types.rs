//! Common types used throughout deltafeed
//!
//! Shared type aliases and small enums used by more than one module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// One feed item, keyed by qualified element name (`title`, `dc:source`, ...)
pub type Item = JsonValue;

/// Ordered key-value map with string keys and values
pub type StringMap = BTreeMap<String, String>;

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff between fetch attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Same delay before every retry
    #[default]
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    Exponential,
}

// ============================================================================
// Query Encoding
// ============================================================================

/// How extra query parameters are written into the request URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryEncoding {
    /// Keys and values are written verbatim
    #[default]
    Raw,
    /// Keys and values are form-urlencoded
    Percent,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle blank strings
pub trait OptionStringExt {
    /// Returns None if the string is empty or only whitespace
    fn none_if_blank(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_blank(self) -> Option<String> {
        self.filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_default_is_constant() {
        assert_eq!(BackoffType::default(), BackoffType::Constant);
    }

    #[test]
    fn test_backoff_serde() {
        let backoff: BackoffType = serde_json::from_str("\"exponential\"").unwrap();
        assert_eq!(backoff, BackoffType::Exponential);
    }

    #[test]
    fn test_query_encoding_serde() {
        let encoding: QueryEncoding = serde_json::from_str("\"percent\"").unwrap();
        assert_eq!(encoding, QueryEncoding::Percent);

        let json = serde_json::to_string(&QueryEncoding::Raw).unwrap();
        assert_eq!(json, "\"raw\"");
    }

    #[test]
    fn test_option_string_none_if_blank() {
        assert_eq!(
            Some("next".to_string()).none_if_blank(),
            Some("next".to_string())
        );
        assert_eq!(Some("  ".to_string()).none_if_blank(), None);
        assert_eq!(None::<String>.none_if_blank(), None);
    }
}
