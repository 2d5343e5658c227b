//! The delta API client

use super::types::{PaginationState, PaginationStats};
use crate::cancel::CancellationToken;
use crate::config::{ClientConfig, ClientOptions};
use crate::error::{Error, Result};
use crate::feed::{FeedParser, Page, RssParser};
use crate::http::{FetchObserver, Fetcher, ReqwestTransport, TracingObserver, Transport};
use crate::request::build_first_url;
use crate::types::{Item, JsonValue};
use bytes::Bytes;
use futures::Stream;
use std::sync::Arc;
use tracing::debug;

/// Pull-based client over one delta stream
///
/// Each call to [`next_item`](Self::next_item) returns one item, fetching and
/// parsing the next page whenever the current one is used up. Methods take
/// `&mut self`; a client is not meant to be shared between tasks, so use one
/// client per stream or serialize access yourself.
pub struct DeltaClient<T = ReqwestTransport, P = RssParser> {
    config: ClientConfig,
    first_url: String,
    fetcher: Fetcher<T>,
    parser: P,
    state: PaginationState,
    stats: PaginationStats,
    empty_streak: u32,
}

impl DeltaClient {
    /// Create a client over HTTP from a validated configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.fetch)?;
        let parser = RssParser::from_policy(&config.pagination);
        Self::with_parts(config, transport, parser)
    }

    /// Create a client from construction options
    pub fn from_options(options: ClientOptions) -> Result<Self> {
        Self::new(options.into_config()?)
    }

    /// Create a client from JSON options
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        Self::from_options(ClientOptions::from_json(value)?)
    }
}

impl<T: Transport, P: FeedParser> DeltaClient<T, P> {
    /// Create a client with a custom transport and parser
    pub fn with_parts(config: ClientConfig, transport: T, parser: P) -> Result<Self> {
        config.validate()?;
        let first_url = build_first_url(&config);
        let fetcher = Fetcher::new(transport, config.fetch.clone())
            .with_observer(Arc::new(TracingObserver::new(config.debug)));

        Ok(Self {
            config,
            first_url,
            fetcher,
            parser,
            state: PaginationState::new(),
            stats: PaginationStats::new(),
            empty_streak: 0,
        })
    }

    /// Replace the fetch event observer
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.fetcher = self.fetcher.with_observer(observer);
        self
    }

    /// Replace the cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.fetcher = self.fetcher.with_cancellation(token);
        self
    }

    /// Token that stops in-flight and future fetches
    pub fn cancellation_token(&self) -> &CancellationToken {
        self.fetcher.cancellation_token()
    }

    /// Configuration in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Parser in use
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Transport in use
    pub fn transport(&self) -> &T {
        self.fetcher.transport()
    }

    /// URL of the first page
    pub fn first_url(&self) -> &str {
        &self.first_url
    }

    /// URL the next fetch will use, if set
    pub fn next_url(&self) -> Option<&str> {
        self.state.next_url()
    }

    /// Point the next fetch at `url`
    pub fn set_next_url(&mut self, url: Option<String>) {
        self.state.set_next_url(url);
    }

    /// URL most recently fetched
    pub fn last_url(&self) -> Option<&str> {
        self.state.last_url()
    }

    /// Pagination state
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Get statistics
    pub fn stats(&self) -> &PaginationStats {
        &self.stats
    }

    /// Return the next item, fetching pages as needed
    pub async fn next_item(&mut self) -> Result<Item> {
        loop {
            if let Some(item) = self.state.take_item() {
                self.stats.add_item();
                return Ok(item);
            }

            let url = self.page_url()?;
            let body = self.fetcher.fetch(&url).await?;
            self.state.record_fetch(&url);
            self.stats.add_page();

            let page = self.parser.parse(&body)?;
            debug!(
                "Page from {}: {} items, continuation {:?}",
                url,
                page.len(),
                page.next_request
            );
            let empty = page.is_empty();
            self.check_continuation_loop(&url, &page)?;
            self.state.install_page(page);
            self.check_empty_streak(&url, empty)?;
        }
    }

    /// Fetch one raw page without parsing it
    ///
    /// Uses `next_url`, or the first-page URL when none is set. The
    /// continuation is not followed: call [`set_next_url`](Self::set_next_url)
    /// between calls to move forward.
    pub async fn next_feed(&mut self) -> Result<Bytes> {
        let url = self
            .state
            .next_url()
            .map_or_else(|| self.first_url.clone(), str::to_string);

        let body = self.fetcher.fetch(&url).await?;
        self.state.record_fetch(&url);
        self.stats.add_page();
        Ok(body)
    }

    /// Turn the client into a stream of items
    ///
    /// The stream ends when the upstream runs out of pages, or right after
    /// yielding the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Item>> {
        futures::stream::unfold(Some(self), |client| async move {
            let mut client = client?;
            match client.next_item().await {
                Ok(item) => Some((Ok(item), Some(client))),
                Err(Error::StreamExhausted { .. }) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    fn page_url(&self) -> Result<String> {
        match self.state.next_url() {
            Some(url) => Ok(url.to_string()),
            None if !self.state.is_started() => Ok(self.first_url.clone()),
            None => Err(Error::StreamExhausted {
                last_url: self.state.last_url().unwrap_or_default().to_string(),
            }),
        }
    }

    /// Stop on an empty page that names itself as the next one
    fn check_continuation_loop(&mut self, url: &str, page: &Page) -> Result<()> {
        if page.is_empty() && page.next_request.as_deref() == Some(url) {
            self.empty_streak = 0;
            self.stats.add_empty_page();
            return Err(Error::ContinuationLoop {
                url: url.to_string(),
            });
        }
        Ok(())
    }

    /// Stop after too many empty pages in a row
    ///
    /// Runs after the page is installed, so `next_url` already points past it.
    fn check_empty_streak(&mut self, url: &str, empty: bool) -> Result<()> {
        if !empty {
            self.empty_streak = 0;
            return Ok(());
        }

        self.empty_streak += 1;
        self.stats.add_empty_page();

        if let Some(limit) = self.config.pagination.max_empty_pages {
            if self.empty_streak > limit {
                let count = self.empty_streak;
                self.empty_streak = 0;
                return Err(Error::TooManyEmptyPages {
                    count,
                    url: url.to_string(),
                });
            }
        }

        Ok(())
    }
}

impl<T, P> std::fmt::Debug for DeltaClient<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeltaClient")
            .field("method", &self.config.method)
            .field("next_url", &self.state.next_url())
            .field("last_url", &self.state.last_url())
            .field("remaining", &self.state.remaining())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
