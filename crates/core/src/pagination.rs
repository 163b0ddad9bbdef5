//! Page cursor for incremental ("load more") listings.
//!
//! The service never reports a total count, so whether another page exists
//! has to be inferred from the size of the page just received.

use serde::Serialize;

/// Default number of foods requested per page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// How `has_more` is derived from a fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HasMore {
    /// A full page means there may be more. A final page that happens to be
    /// exactly full still advertises a next page, which then comes back empty.
    #[default]
    FullPage,
    /// Ask for one record more than the page size and only advertise a next
    /// page when that extra record arrives. The extra record is dropped.
    Lookahead,
}

/// Current position in a paged listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageCursor {
    pub page: usize,
    pub page_size: usize,
    pub has_more: bool,
    /// Known once a short page has been seen
    pub total_pages: Option<usize>,
    pub strategy: HasMore,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageCursor {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            has_more: true,
            total_pages: None,
            strategy: HasMore::FullPage,
        }
    }

    pub fn with_strategy(mut self, strategy: HasMore) -> Self {
        self.strategy = strategy;
        self
    }

    /// Offset of the first record of `page`
    pub fn offset_for(&self, page: usize) -> usize {
        page.saturating_sub(1) * self.page_size
    }

    pub fn offset(&self) -> usize {
        self.offset_for(self.page)
    }

    /// `limit` to send to the service for one page
    pub fn request_limit(&self) -> usize {
        match self.strategy {
            HasMore::FullPage => self.page_size,
            HasMore::Lookahead => self.page_size + 1,
        }
    }

    pub fn next_page(&self) -> usize {
        self.page + 1
    }

    /// Back to the first page of a new query
    pub fn reset(&mut self) {
        self.page = 1;
        self.has_more = true;
        self.total_pages = None;
    }

    /// Record that `page` came back with `received` records.
    ///
    /// Returns how many of the received records belong to the page.
    pub fn record_page(&mut self, page: usize, received: usize) -> usize {
        let (has_more, kept) = match self.strategy {
            HasMore::FullPage => (received == self.page_size, received),
            HasMore::Lookahead => (received > self.page_size, received.min(self.page_size)),
        };

        self.page = page;
        self.has_more = has_more;
        if !has_more {
            self.total_pages = Some(page);
        }
        kept
    }

    /// A lookup by code produced a single record and nothing else to page
    pub fn collapse_to_single(&mut self) {
        self.page = 1;
        self.has_more = false;
        self.total_pages = Some(1);
    }
}
