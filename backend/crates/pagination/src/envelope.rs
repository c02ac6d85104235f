//! Page requests and the response envelope returned by list endpoints.

use serde::Serialize;
use url::Url;

use crate::cursor::{Cursor, CursorError};

/// Page size applied when the client does not ask for one.
pub const DEFAULT_LIMIT: usize = 20;
/// Largest page size a client may request.
pub const MAX_LIMIT: usize = 100;

/// Errors raised when validating a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// The requested limit was zero or above [`MAX_LIMIT`].
    #[error("limit must be between 1 and {max}, got {requested}")]
    LimitOutOfRange {
        /// Limit supplied by the client.
        requested: usize,
        /// Upper bound accepted by the server.
        max: usize,
    },
}

/// Validated page size for a single list call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: usize,
}

impl PageRequest {
    /// Validate an optional client-supplied limit.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::LimitOutOfRange`] for zero or oversized
    /// limits.
    ///
    /// # Examples
    /// ```
    /// use pagination::{DEFAULT_LIMIT, PageRequest};
    ///
    /// assert_eq!(PageRequest::new(None).map(PageRequest::limit), Ok(DEFAULT_LIMIT));
    /// assert!(PageRequest::new(Some(0)).is_err());
    /// ```
    pub const fn new(limit: Option<usize>) -> Result<Self, PageRequestError> {
        match limit {
            None => Ok(Self {
                limit: DEFAULT_LIMIT,
            }),
            Some(requested) if requested == 0 || requested > MAX_LIMIT => {
                Err(PageRequestError::LimitOutOfRange {
                    requested,
                    max: MAX_LIMIT,
                })
            }
            Some(requested) => Ok(Self { limit: requested }),
        }
    }

    /// Number of items returned per page.
    #[must_use]
    pub const fn limit(self) -> usize {
        self.limit
    }

    /// Number of rows an adapter should fetch to learn whether another page
    /// follows.
    #[must_use]
    pub const fn probe_limit(self) -> usize {
        self.limit.saturating_add(1)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Hypermedia links for navigating a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    /// Link reproducing the current page.
    #[serde(rename = "self")]
    pub self_link: String,
    /// Link to the following page, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PageLinks {
    /// Build links relative to the URL that produced `page`.
    #[must_use]
    pub fn for_page<T>(request_url: &Url, page: &Page<T>) -> Self {
        let next = page
            .next_cursor
            .as_deref()
            .map(|cursor| with_cursor(request_url, page.limit, cursor));
        Self {
            self_link: request_url.to_string(),
            next,
        }
    }
}

fn with_cursor(base: &Url, limit: usize, cursor: &str) -> String {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "cursor" && key != "limit")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut next = base.clone();
    next.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("limit", &limit.to_string())
        .append_pair("cursor", cursor);
    next.to_string()
}

/// One page of a listing plus the cursor for the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in listing order.
    pub data: Vec<T>,
    /// Page size used to produce this page.
    pub limit: usize,
    /// Opaque cursor for the following page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Navigation links, when the caller knows its request URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<PageLinks>,
}

impl<T> Page<T> {
    /// Build a page from rows fetched with [`PageRequest::probe_limit`].
    ///
    /// A probe row beyond the limit proves another page exists. It is dropped
    /// and the cursor points at the last retained row.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError`] when the ordering key cannot be encoded.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageRequest};
    ///
    /// let request = PageRequest::new(Some(2)).expect("valid limit");
    /// let page = Page::from_probe(vec![1, 2, 3], request, |n| *n).expect("page");
    /// assert_eq!(page.data, vec![1, 2]);
    /// assert!(page.next_cursor.is_some());
    /// ```
    pub fn from_probe<K, F>(
        mut rows: Vec<T>,
        request: PageRequest,
        key_of: F,
    ) -> Result<Self, CursorError>
    where
        K: Serialize,
        F: Fn(&T) -> K,
    {
        let has_more = rows.len() > request.limit();
        rows.truncate(request.limit());
        let next_cursor = match rows.last() {
            Some(last) if has_more => Some(Cursor::new(key_of(last)).encode()?),
            _ => None,
        };
        Ok(Self {
            data: rows,
            limit: request.limit(),
            next_cursor,
            links: None,
        })
    }

    /// Attach navigation links derived from the request URL.
    #[must_use]
    pub fn with_links(mut self, request_url: &Url) -> Self {
        self.links = Some(PageLinks::for_page(request_url, &self));
        self
    }

    /// Convert every item while keeping the cursor and links.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            limit: self.limit,
            next_cursor: self.next_cursor,
            links: self.links,
        }
    }
}
