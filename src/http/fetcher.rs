//! Fetcher with bounded retries
//!
//! Handles:
//! - URL validation before the first attempt
//! - Immediate failure on 4xx responses
//! - Sleep-and-retry on server errors, empty bodies and transport failures
//! - Cancellation before every attempt and every sleep

use super::observer::{FetchEvent, FetchObserver, TracingObserver};
use super::transport::Transport;
use crate::cancel::CancellationToken;
use crate::config::FetchPolicy;
use crate::error::{Error, Result};
use bytes::Bytes;
use std::sync::Arc;

/// Longest body excerpt kept in a status error
const BODY_EXCERPT: usize = 512;

/// GET with a retry budget
pub struct Fetcher<T> {
    transport: T,
    policy: FetchPolicy,
    observer: Arc<dyn FetchObserver>,
    cancel: CancellationToken,
}

impl<T: Transport> Fetcher<T> {
    /// Create a fetcher that traces through `tracing`
    pub fn new(transport: T, policy: FetchPolicy) -> Self {
        Self {
            transport,
            policy,
            observer: Arc::new(TracingObserver::default()),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the event observer
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replace the cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Fetch policy in use
    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Token that stops this fetcher
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fetch `url`, returning the first non-empty successful body
    ///
    /// The URL is handed to the transport exactly as given.
    pub async fn fetch(&self, url: &str) -> Result<Bytes> {
        url::Url::parse(url)?;

        let max_attempts = self.policy.attempts();
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            self.check_cancelled(url)?;
            self.observer.on_event(&FetchEvent::Attempt {
                url,
                attempt,
                max_attempts,
            });

            let error = match self.transport.get(url).await {
                Ok(response) => {
                    self.observer.on_event(&FetchEvent::Response {
                        url,
                        status: response.status,
                        bytes: response.body.len(),
                    });

                    if response.is_success() && !response.body.is_empty() {
                        return Ok(response.body);
                    }
                    if response.is_client_error() {
                        return Err(Error::ClientStatus {
                            status: response.status,
                            url: url.to_string(),
                        });
                    }
                    if response.is_success() {
                        Error::EmptyResponse {
                            status: response.status,
                        }
                    } else {
                        let excerpt = &response.body[..response.body.len().min(BODY_EXCERPT)];
                        Error::http_status(response.status, String::from_utf8_lossy(excerpt))
                    }
                }
                Err(e) if e.is_retryable() => {
                    self.observer
                        .on_event(&FetchEvent::TransportFailure { url, error: &e });
                    e
                }
                Err(e) => return Err(e),
            };
            last_error = Some(error);

            if attempt < max_attempts {
                self.check_cancelled(url)?;
                let delay = self.policy.delay_for(attempt - 1);
                self.observer.on_event(&FetchEvent::Sleeping { url, delay });
                if !self.cancel.sleep(delay).await {
                    return Err(Error::Cancelled {
                        url: url.to_string(),
                    });
                }
            }
        }

        Err(Error::RetriesExhausted {
            url: url.to_string(),
            attempts: max_attempts,
            last_error: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    fn check_cancelled(&self, url: &str) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled {
                url: url.to_string(),
            });
        }
        Ok(())
    }
}

impl<T> std::fmt::Debug for Fetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("policy", &self.policy)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
