//! Generic list controller.
//!
//! Owns the presentation state behind every filtered, paginated listing:
//! the current filter set, page position, load phase, and a generation
//! counter that makes overlapping fetches safe. The controller performs
//! no I/O itself; callers take a [`FetchTicket`], run the request with
//! [`crate::ChairsideClient`] (or anything else), and hand the outcome
//! back to [`ListController::resolve`]. A response from a superseded
//! fetch is discarded, so a slow page-2 response can never clobber the
//! page-1 data the user has already navigated back to.

use chairside_core::{DEFAULT_PAGE_SIZE, Page};

/// A set of listing filters.
///
/// `encode` covers only the filters the server applies; filters the UI
/// applies locally to an already-fetched page (like a name search) are
/// carried on the struct but left out of the encoding. The controller
/// compares encodings to decide whether a change requires a new fetch.
pub trait FilterSet: Clone + Default {
    /// Canonical query pairs for the remote filters.
    fn encode(&self) -> Vec<(String, String)>;

    /// Rebuild the filter set from encoded pairs, ignoring unknown keys.
    fn decode(pairs: &[(String, String)]) -> Self;
}

/// Load phase of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPhase {
    /// No fetch started yet.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The latest fetch succeeded.
    Loaded,
    /// The latest fetch failed; the previous page data is retained.
    Failed(String),
}

/// Handle for one fetch: the generation it belongs to and the query to
/// send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub query: Vec<(String, String)>,
}

/// Presentation state for one filtered, paginated listing.
#[derive(Debug, Clone)]
pub struct ListController<T, F: FilterSet> {
    filter: F,
    page: u32,
    page_size: u32,
    generation: u64,
    phase: ListPhase,
    data: Option<Page<T>>,
}

impl<T, F: FilterSet> Default for ListController<T, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F: FilterSet> ListController<T, F> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            filter: F::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            generation: 0,
            phase: ListPhase::Idle,
            data: None,
        }
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn phase(&self) -> &ListPhase {
        &self.phase
    }

    /// The most recently loaded page, retained across failed refetches.
    pub fn data(&self) -> Option<&Page<T>> {
        self.data.as_ref()
    }

    /// Replace the filter set.
    ///
    /// When the remote encoding changes, the page resets to 1 and the
    /// generation advances, invalidating any fetch still in flight.
    /// Local-only changes keep both, so typing in a search box never
    /// discards the loaded page.
    pub fn set_filter(&mut self, filter: F) {
        let remote_changed = filter.encode() != self.filter.encode();
        self.filter = filter;
        if remote_changed {
            self.page = 1;
            self.generation += 1;
        }
    }

    /// Navigate to a page.
    pub fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        if page != self.page {
            self.page = page;
            self.generation += 1;
        }
    }

    /// Change the page size, returning to page 1.
    pub fn set_page_size(&mut self, page_size: u32) {
        if page_size != self.page_size {
            self.page_size = page_size;
            self.page = 1;
            self.generation += 1;
        }
    }

    /// Start a fetch for the current filter and page.
    ///
    /// Marks the listing as loading and returns the generation-tagged
    /// query. Calling this again without changing state (a retry) yields
    /// the same ticket.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.phase = ListPhase::Loading;
        let mut query = self.filter.encode();
        query.push(("page".to_owned(), self.page.to_string()));
        query.push(("pageSize".to_owned(), self.page_size.to_string()));
        FetchTicket {
            generation: self.generation,
            query,
        }
    }

    /// Apply a fetch outcome.
    ///
    /// Returns `false` when the ticket's generation has been superseded;
    /// the outcome is then dropped without touching any state.
    pub fn resolve(&mut self, generation: u64, outcome: Result<Page<T>, String>) -> bool {
        if generation != self.generation {
            return false;
        }
        match outcome {
            Ok(page) => {
                self.data = Some(page);
                self.phase = ListPhase::Loaded;
            }
            Err(message) => {
                self.phase = ListPhase::Failed(message);
            }
        }
        true
    }

    /// Encode filter and page position, e.g. for a shareable URL.
    #[must_use]
    pub fn encode_state(&self) -> Vec<(String, String)> {
        let mut pairs = self.filter.encode();
        if self.page != 1 {
            pairs.push(("page".to_owned(), self.page.to_string()));
        }
        if self.page_size != DEFAULT_PAGE_SIZE {
            pairs.push(("pageSize".to_owned(), self.page_size.to_string()));
        }
        pairs
    }

    /// Restore filter and page position from encoded pairs.
    pub fn restore(&mut self, pairs: &[(String, String)]) {
        self.filter = F::decode(pairs);
        self.page = pairs
            .iter()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
            .unwrap_or(1);
        self.page_size = pairs
            .iter()
            .find(|(key, _)| key == "pageSize")
            .and_then(|(_, value)| value.parse().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct TestFilter {
        tier: Option<String>,
        // Applied locally, never encoded.
        search: String,
    }

    impl FilterSet for TestFilter {
        fn encode(&self) -> Vec<(String, String)> {
            match &self.tier {
                Some(tier) => vec![("tier".to_owned(), tier.clone())],
                None => Vec::new(),
            }
        }

        fn decode(pairs: &[(String, String)]) -> Self {
            Self {
                tier: pairs
                    .iter()
                    .find(|(key, _)| key == "tier")
                    .map(|(_, value)| value.clone()),
                search: String::new(),
            }
        }
    }

    fn page_of(items: Vec<&str>) -> Page<String> {
        let total = items.len() as u64;
        Page::new(items.into_iter().map(String::from).collect(), total, 1, 20)
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut controller: ListController<String, TestFilter> = ListController::new();
        let first = controller.begin_fetch();

        // The filter changes while the first fetch is still in flight.
        controller.set_filter(TestFilter {
            tier: Some("cold".to_owned()),
            search: String::new(),
        });
        let second = controller.begin_fetch();

        // The slow first response arrives after the second.
        assert!(controller.resolve(second.generation, Ok(page_of(vec!["b"]))));
        assert!(!controller.resolve(first.generation, Ok(page_of(vec!["a"]))));

        let data = controller.data().unwrap();
        assert_eq!(data.items, vec!["b".to_owned()]);
        assert_eq!(*controller.phase(), ListPhase::Loaded);
    }

    #[test]
    fn remote_filter_change_resets_page() {
        let mut controller: ListController<String, TestFilter> = ListController::new();
        controller.set_page(4);
        assert_eq!(controller.page(), 4);

        controller.set_filter(TestFilter {
            tier: Some("hot".to_owned()),
            search: String::new(),
        });
        assert_eq!(controller.page(), 1);
    }

    #[test]
    fn local_filter_change_keeps_page_and_generation() {
        let mut controller: ListController<String, TestFilter> = ListController::new();
        controller.set_page(3);
        let before = controller.begin_fetch();

        controller.set_filter(TestFilter {
            tier: None,
            search: "okon".to_owned(),
        });
        assert_eq!(controller.page(), 3);

        // The in-flight fetch is still valid.
        assert!(controller.resolve(before.generation, Ok(page_of(vec!["a"]))));
    }

    #[test]
    fn failed_fetch_keeps_previous_data_and_retry_reuses_query() {
        let mut controller: ListController<String, TestFilter> = ListController::new();
        let ticket = controller.begin_fetch();
        controller.resolve(ticket.generation, Ok(page_of(vec!["a"])));

        let retry = controller.begin_fetch();
        controller.resolve(retry.generation, Err("connection error".to_owned()));

        assert_eq!(
            *controller.phase(),
            ListPhase::Failed("connection error".to_owned())
        );
        assert!(controller.data().is_some());

        // Retrying without state changes produces the identical ticket.
        assert_eq!(controller.begin_fetch(), retry);
    }

    #[test]
    fn state_round_trips_through_encoding() {
        let mut controller: ListController<String, TestFilter> = ListController::new();
        controller.set_filter(TestFilter {
            tier: Some("cold".to_owned()),
            search: String::new(),
        });
        controller.set_page_size(50);
        controller.set_page(2);

        let encoded = controller.encode_state();
        let mut restored: ListController<String, TestFilter> = ListController::new();
        restored.restore(&encoded);

        assert_eq!(restored.filter().tier, Some("cold".to_owned()));
        assert_eq!(restored.page(), 2);
        assert_eq!(restored.page_size(), 50);
        assert_eq!(restored.encode_state(), encoded);
    }

    #[test]
    fn default_page_values_are_omitted_from_encoding() {
        let controller: ListController<String, TestFilter> = ListController::new();
        assert!(controller.encode_state().is_empty());
    }
}
