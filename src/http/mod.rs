//! HTTP module
//!
//! Provides the transport seam and the retrying fetcher built on top of it.
//!
//! # Features
//!
//! - **Transport trait**: `GET(url) -> status, body`, reqwest-backed by default
//! - **Bounded retries**: 4xx responses abort, everything else sleeps and retries
//! - **Backoff Strategies**: Constant (default), linear and exponential delays
//! - **Observability**: every attempt, status and sleep goes to a [`FetchObserver`]
//! - **Cancellation**: checked before each attempt and interrupts sleeps

mod fetcher;
mod observer;
mod transport;

pub use fetcher::Fetcher;
pub use observer::{FetchEvent, FetchObserver, TracingObserver};
pub use transport::{RawResponse, ReqwestTransport, Transport};

#[cfg(test)]
pub(crate) mod testing;
