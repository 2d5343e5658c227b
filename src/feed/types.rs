//! Page types and the parser trait

use crate::error::Result;
use crate::types::{Item, JsonObject};

/// One parsed API response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Channel-level metadata, keyed by qualified element name
    pub channel: JsonObject,
    /// Items in document order
    pub items: Vec<Item>,
    /// URL of the next page, if the response carried one
    pub next_request: Option<String>,
}

impl Page {
    /// Create a page from items and an optional continuation
    pub fn new(items: Vec<Item>, next_request: Option<String>) -> Self {
        Self {
            channel: JsonObject::new(),
            items,
            next_request,
        }
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Trait for turning response bodies into pages
pub trait FeedParser: Send + Sync {
    /// Parse a response body
    fn parse(&self, body: &[u8]) -> Result<Page>;
}
