//! Fetch trace events
//!
//! The fetcher reports what it is doing to a [`FetchObserver`] instead of
//! writing to a console. Observers return nothing, so tracing can never turn
//! into a fetch failure.

use crate::error::Error;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A single step of a fetch
#[derive(Debug)]
pub enum FetchEvent<'a> {
    /// An attempt is about to start (1-based)
    Attempt {
        url: &'a str,
        attempt: u32,
        max_attempts: u32,
    },
    /// The transport returned a response
    Response {
        url: &'a str,
        status: u16,
        bytes: usize,
    },
    /// The transport failed without a response
    TransportFailure { url: &'a str, error: &'a Error },
    /// The fetcher is about to sleep before retrying
    Sleeping { url: &'a str, delay: Duration },
}

/// Receiver of fetch events
pub trait FetchObserver: Send + Sync {
    /// Handle one event
    fn on_event(&self, event: &FetchEvent<'_>);
}

impl<F> FetchObserver for F
where
    F: Fn(&FetchEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &FetchEvent<'_>) {
        self(event);
    }
}

/// Observer that forwards events to `tracing`
///
/// Attempts and responses are logged at `debug`, or `info` when verbose.
/// Failures and sleeps are always `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver {
    verbose: bool,
}

impl TracingObserver {
    /// Create an observer
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl FetchObserver for TracingObserver {
    fn on_event(&self, event: &FetchEvent<'_>) {
        match event {
            FetchEvent::Attempt {
                url,
                attempt,
                max_attempts,
            } => {
                if self.verbose {
                    info!("Fetching {url} (attempt {attempt}/{max_attempts})");
                } else {
                    debug!("Fetching {url} (attempt {attempt}/{max_attempts})");
                }
            }
            FetchEvent::Response { url, status, bytes } => {
                if self.verbose {
                    info!("{url} -> HTTP {status}, {bytes} bytes");
                } else {
                    debug!("{url} -> HTTP {status}, {bytes} bytes");
                }
            }
            FetchEvent::TransportFailure { url, error } => {
                warn!("Request to {url} failed: {error}");
            }
            FetchEvent::Sleeping { url, delay } => {
                warn!("Retrying {url} in {delay:?}");
            }
        }
    }
}
