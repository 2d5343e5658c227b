//! Pagination state and statistics

use crate::feed::Page;
use crate::types::Item;

/// Cursor over the current page plus the URLs around it
///
/// `cursor` always indexes an unread item of `current_page`, or the page is
/// absent. `next_url` is overwritten by every installed page, even with `None`.
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    next_url: Option<String>,
    last_url: Option<String>,
    current_page: Option<Page>,
    cursor: usize,
    started: bool,
}

impl PaginationState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// URL of the next page to fetch
    pub fn next_url(&self) -> Option<&str> {
        self.next_url.as_deref()
    }

    /// Override the URL of the next page
    pub fn set_next_url(&mut self, url: Option<String>) {
        self.next_url = url;
    }

    /// URL most recently fetched
    pub fn last_url(&self) -> Option<&str> {
        self.last_url.as_deref()
    }

    /// Record a completed fetch
    pub fn record_fetch(&mut self, url: &str) {
        self.last_url = Some(url.to_string());
    }

    /// Whether any page has been installed
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether a page is being read
    pub fn has_page(&self) -> bool {
        self.current_page.is_some()
    }

    /// Position within the current page
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Unread items left on the current page
    pub fn remaining(&self) -> usize {
        self.current_page
            .as_ref()
            .map_or(0, |page| page.len().saturating_sub(self.cursor))
    }

    /// Make `page` current and adopt its continuation URL
    pub fn install_page(&mut self, page: Page) {
        self.next_url.clone_from(&page.next_request);
        self.current_page = Some(page);
        self.cursor = 0;
        self.started = true;
    }

    /// Move the item under the cursor out of the page
    ///
    /// The page is retired once its last item is taken, or immediately if it
    /// has none. Returns `None` when there is nothing left to read.
    pub fn take_item(&mut self) -> Option<Item> {
        let page = self.current_page.as_mut()?;

        if self.cursor >= page.items.len() {
            self.retire_page();
            return None;
        }

        let item = std::mem::take(&mut page.items[self.cursor]);
        self.cursor += 1;
        if self.cursor == page.items.len() {
            self.retire_page();
        }
        Some(item)
    }

    fn retire_page(&mut self) {
        self.current_page = None;
        self.cursor = 0;
    }
}

/// Counters for a client's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationStats {
    /// Pages fetched successfully
    pub pages_fetched: u64,
    /// Items handed to the caller
    pub items_returned: u64,
    /// Parsed pages that carried no items
    pub empty_pages: u64,
}

impl PaginationStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a returned item
    pub fn add_item(&mut self) {
        self.items_returned += 1;
    }

    /// Add an empty page
    pub fn add_empty_page(&mut self) {
        self.empty_pages += 1;
    }
}
