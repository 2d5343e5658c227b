//! # deltafeed
//!
//! A pull-based client for paginated REST+XML content-delta APIs.
//!
//! The API returns items in RSS pages; each page names the next one in a
//! continuation element. deltafeed builds the first request URL, fetches
//! pages with bounded retries, parses them, and hands out items one at a
//! time, following continuations as pages run out.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deltafeed::{DeltaClient, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut client = DeltaClient::from_json(&json!({
//!         "api": "permalink.getDelta",
//!         "parameters": { "vendor": "acme" }
//!     }))?;
//!
//!     loop {
//!         match client.next_item().await {
//!             Ok(item) => println!("{}", item["link"]),
//!             Err(e) if e.is_exhausted() => break,
//!             Err(e) => return Err(e),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                DeltaClient (pagination)                  │
//! │  next_item() → Item     next_feed() → Bytes    stream    │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────────┬─────────────┴────────────┬────────────────┐
//! │   request    │           http           │      feed      │
//! ├──────────────┼──────────────────────────┼────────────────┤
//! │ first URL    │ Transport (reqwest)      │ FeedParser     │
//! │ encoding     │ Fetcher: retry, backoff  │ RssParser      │
//! │              │ observer, cancellation   │ (quick-xml)    │
//! └──────────────┴──────────────────────────┴────────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration and construction options
pub mod config;

/// First-page URL construction
pub mod request;

/// Cooperative cancellation
pub mod cancel;

/// Transport and retrying fetcher
pub mod http;

/// Page parsing
pub mod feed;

/// Pull loop over paginated responses
pub mod pagination;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use cancel::CancellationToken;
pub use config::{ClientConfig, ClientOptions, FetchPolicy, PaginationPolicy};
pub use error::{Error, Result};
pub use feed::{FeedParser, Page, RssParser};
pub use http::{FetchEvent, FetchObserver, Fetcher, RawResponse, ReqwestTransport, Transport};
pub use pagination::{DeltaClient, PaginationState, PaginationStats};
pub use request::build_first_url;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
