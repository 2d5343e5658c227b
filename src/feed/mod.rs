//! Feed module
//!
//! Turns a response body into a [`Page`]: channel metadata, the ordered item
//! list and the continuation URL pointing at the next page.
//!
//! # Overview
//!
//! [`FeedParser`] is the seam the paginator depends on. [`RssParser`] is the
//! default implementation for RSS 2.0 style responses, built on quick-xml.

mod parser;
mod types;

pub use parser::RssParser;
pub use types::{FeedParser, Page};
