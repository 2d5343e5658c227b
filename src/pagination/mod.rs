//! Pagination module
//!
//! Turns a chain of pages into a flat, lazy sequence of items.
//!
//! # Overview
//!
//! [`DeltaClient`] owns a [`PaginationState`] and pulls one item at a time.
//! When the current page runs out it fetches the page named by the previous
//! page's continuation URL, so callers never see page boundaries. A page
//! without a continuation ends the stream with
//! [`Error::StreamExhausted`](crate::Error::StreamExhausted).

mod client;
mod types;

pub use client::DeltaClient;
pub use types::{PaginationState, PaginationStats};
