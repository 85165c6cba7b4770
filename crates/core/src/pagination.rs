//! Page-number pagination and the list response envelope.
//!
//! Every list endpoint returns the same [`Page`] shape regardless of the
//! entity. Page numbers are 1-based; requesting a page past the end is not an
//! error and yields an empty `data` array with the full `count`.

use serde::Serialize;

use crate::error::CoreError;
use crate::filter::QueryParams;
use crate::validation::FieldErrors;

/// Page served when `page` is absent.
pub const DEFAULT_PAGE: i64 = 1;

/// Items per page when `page_size` is absent.
pub const DEFAULT_PAGE_SIZE: i64 = 5;

/// Largest accepted `page_size`.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameter names.
pub mod params {
    pub const PAGE: &str = "page";
    pub const PAGE_SIZE: &str = "page_size";
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Validate explicit values. `page < 1` and `page_size` outside
    /// `1..=MAX_PAGE_SIZE` are rejected.
    pub fn new(page: i64, page_size: i64) -> Result<Self, CoreError> {
        let mut errors = FieldErrors::new();
        if page < 1 {
            errors.add(params::PAGE, "Page number must be 1 or greater.");
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            errors.add(
                params::PAGE_SIZE,
                format!("Page size must be between 1 and {MAX_PAGE_SIZE}."),
            );
        }
        errors.into_result()?;
        Ok(Self { page, page_size })
    }

    /// Read `page` and `page_size` from raw query parameters, applying
    /// defaults for absent values.
    pub fn from_query(query: &QueryParams) -> Result<Self, CoreError> {
        let mut errors = FieldErrors::new();

        let page = parse_param(query, params::PAGE, DEFAULT_PAGE, &mut errors);
        let page_size = parse_param(query, params::PAGE_SIZE, DEFAULT_PAGE_SIZE, &mut errors);
        errors.into_result()?;

        Self::new(page, page_size)
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Rows to skip (`(page - 1) * page_size`).
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Rows to take.
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Whether rows exist after this page.
    pub fn has_next(&self, count: i64) -> bool {
        self.page.saturating_mul(self.page_size) < count
    }

    /// Whether a previous page link should be offered.
    pub fn has_previous(&self, count: i64) -> bool {
        self.page > 1 && count > 0
    }

    /// Number of the last non-empty page (0 for an empty set).
    pub fn last_page(&self, count: i64) -> i64 {
        if count <= 0 {
            0
        } else {
            (count + self.page_size - 1) / self.page_size
        }
    }

    /// Apply the window to an in-memory, already ordered slice.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let len = items.len();
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX).min(len);
        let end = start
            .saturating_add(usize::try_from(self.page_size).unwrap_or(0))
            .min(len);
        &items[start..end]
    }
}

fn parse_param(query: &QueryParams, name: &str, default: i64, errors: &mut FieldErrors) -> i64 {
    match query.get(name).map(|v| v.trim()) {
        None | Some("") => default,
        Some(raw) => raw.parse::<i64>().unwrap_or_else(|_| {
            errors.add(name, "A valid integer is required.");
            default
        }),
    }
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// Builds absolute page URLs from the request URL, preserving every other
/// query parameter in its original (still encoded) form.
#[derive(Debug, Clone)]
pub struct PageLinks {
    base_url: String,
    pairs: Vec<String>,
}

impl PageLinks {
    /// `base_url` is scheme, host and path (e.g. `http://host/services/`);
    /// `raw_query` is the undecoded query string without the leading `?`.
    pub fn new(base_url: impl Into<String>, raw_query: Option<&str>) -> Self {
        let pairs = raw_query
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            base_url: base_url.into(),
            pairs,
        }
    }

    /// URL for `page`. Page 1 is addressed by dropping `page` entirely.
    pub fn page_url(&self, page: i64) -> String {
        let mut pairs: Vec<String> = Vec::with_capacity(self.pairs.len() + 1);
        let mut placed = false;

        for pair in &self.pairs {
            if pair_key(pair) == params::PAGE {
                if !placed && page > 1 {
                    pairs.push(format!("{}={page}", params::PAGE));
                }
                placed = true;
            } else {
                pairs.push(pair.clone());
            }
        }
        if !placed && page > 1 {
            pairs.push(format!("{}={page}", params::PAGE));
        }

        if pairs.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}?{}", self.base_url, pairs.join("&"))
        }
    }
}

fn pair_key(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(key, _)| key)
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The list response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub current_page: i64,
    pub data: Vec<T>,
    pub last_page_url: Option<String>,
    pub next_page_url: Option<String>,
    /// Total matching rows, not the page length.
    pub count: i64,
}

impl<T> Page<T> {
    /// Wrap one window of rows. `count` is the filtered total.
    pub fn new(request: PageRequest, data: Vec<T>, count: i64, links: &PageLinks) -> Self {
        let next_page_url = request
            .has_next(count)
            .then(|| links.page_url(request.page() + 1));
        let last_page_url = request
            .has_previous(count)
            .then(|| links.page_url(request.page() - 1));

        Self {
            current_page: request.page(),
            data,
            last_page_url,
            next_page_url,
            count,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            current_page: self.current_page,
            data: self.data.into_iter().map(f).collect(),
            last_page_url: self.last_page_url,
            next_page_url: self.next_page_url,
            count: self.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use assert_matches::assert_matches;

    use super::*;

    fn query(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn links() -> PageLinks {
        PageLinks::new("http://testserver/services/service-types/", Some("page=1&page_size=2"))
    }

    // -- request parsing -----------------------------------------------------

    #[test]
    fn defaults_when_absent() {
        let req = PageRequest::from_query(&QueryParams::new()).unwrap();
        assert_eq!(req, PageRequest::default());
        assert_eq!(req.page_size(), 5);
    }

    #[test]
    fn empty_values_use_defaults() {
        let req = PageRequest::from_query(&query(&[("page", ""), ("page_size", " ")])).unwrap();
        assert_eq!(req, PageRequest::default());
    }

    #[test]
    fn rejects_non_numeric() {
        let err = PageRequest::from_query(&query(&[("page", "two")])).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref e) if e.contains("page"));
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(PageRequest::new(0, 5).is_err());
        assert!(PageRequest::new(-3, 5).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_SIZE + 1).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_SIZE).is_ok());
    }

    #[test]
    fn offset_and_limit() {
        let req = PageRequest::new(3, 2).unwrap();
        assert_eq!(req.offset(), 4);
        assert_eq!(req.limit(), 2);
    }

    // -- window arithmetic ---------------------------------------------------

    #[test]
    fn five_items_two_per_page() {
        let first = PageRequest::new(1, 2).unwrap();
        assert!(first.has_next(5));
        assert!(!first.has_previous(5));

        let last = PageRequest::new(3, 2).unwrap();
        assert!(!last.has_next(5));
        assert!(last.has_previous(5));
        assert_eq!(last.last_page(5), 3);
    }

    #[test]
    fn exact_multiple_has_no_next() {
        let req = PageRequest::new(2, 5).unwrap();
        assert!(!req.has_next(10));
        assert!(req.has_next(11));
    }

    #[test]
    fn empty_set_has_no_links() {
        let req = PageRequest::new(2, 5).unwrap();
        assert!(!req.has_next(0));
        assert!(!req.has_previous(0));
        assert_eq!(req.last_page(0), 0);
    }

    #[test]
    fn pages_partition_the_collection() {
        let items: Vec<u32> = (0..23).collect();
        for page_size in 1..=7 {
            let count = items.len() as i64;
            let last = PageRequest::new(1, page_size).unwrap().last_page(count);
            let mut seen = HashSet::new();
            let mut total = 0;
            for page in 1..=last {
                let window = PageRequest::new(page, page_size).unwrap().slice(&items);
                assert!(window.len() as i64 <= page_size);
                total += window.len();
                seen.extend(window.iter().copied());
            }
            assert_eq!(total, items.len(), "pages overlap for size {page_size}");
            assert_eq!(seen.len(), items.len());
        }
    }

    #[test]
    fn slice_past_end_is_empty() {
        let items = [1, 2, 3];
        assert!(PageRequest::new(9, 2).unwrap().slice(&items).is_empty());
    }

    // -- links ---------------------------------------------------------------

    #[test]
    fn next_link_replaces_page() {
        assert_eq!(
            links().page_url(2),
            "http://testserver/services/service-types/?page=2&page_size=2"
        );
    }

    #[test]
    fn first_page_link_drops_page_param() {
        assert_eq!(
            links().page_url(1),
            "http://testserver/services/service-types/?page_size=2"
        );
    }

    #[test]
    fn page_param_appended_when_missing() {
        let links = PageLinks::new("http://h/services/", Some("title=Deep%20clean"));
        assert_eq!(links.page_url(2), "http://h/services/?title=Deep%20clean&page=2");
    }

    #[test]
    fn bare_base_url_when_no_params_remain() {
        let links = PageLinks::new("http://h/services/", Some("page=2"));
        assert_eq!(links.page_url(1), "http://h/services/");
        let links = PageLinks::new("http://h/services/", None);
        assert_eq!(links.page_url(1), "http://h/services/");
    }

    #[test]
    fn duplicate_page_params_collapse() {
        let links = PageLinks::new("http://h/", Some("page=1&x=1&page=4"));
        assert_eq!(links.page_url(3), "http://h/?page=3&x=1");
    }

    // -- envelope ------------------------------------------------------------

    #[test]
    fn envelope_first_page() {
        let req = PageRequest::new(1, 2).unwrap();
        let page = Page::new(req, vec!["a", "b"], 5, &links());
        assert_eq!(page.current_page, 1);
        assert_eq!(page.count, 5);
        assert!(page.last_page_url.is_none());
        assert!(page.next_page_url.is_some());
    }

    #[test]
    fn envelope_beyond_last_page() {
        let req = PageRequest::new(10, 2).unwrap();
        let page: Page<&str> = Page::new(req, Vec::new(), 5, &links());
        assert!(page.data.is_empty());
        assert_eq!(page.count, 5);
        assert!(page.next_page_url.is_none());
        assert!(page.last_page_url.is_some());
    }

    #[test]
    fn envelope_serializes_nulls() {
        let page: Page<u8> = Page::new(PageRequest::default(), Vec::new(), 0, &links());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "current_page": 1,
                "data": [],
                "last_page_url": null,
                "next_page_url": null,
                "count": 0
            })
        );
    }

    #[test]
    fn map_preserves_metadata() {
        let req = PageRequest::new(2, 1).unwrap();
        let page = Page::new(req, vec![1, 2], 3, &links()).map(|n| n * 10);
        assert_eq!(page.data, vec![10, 20]);
        assert_eq!(page.current_page, 2);
        assert!(page.next_page_url.is_some());
    }
}
