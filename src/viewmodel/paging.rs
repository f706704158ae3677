//! Accumulation of paged results and the last-page / load-more rules.

use crate::domain::NewsResponse;

/// Paging cursor and accumulated results for one logical query.
///
/// `page` is the next page to request. It only moves forward on a
/// successful merge. `generation` changes on every reset, so a response
/// issued before a reset is never merged after it, even for the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedQuery {
    page: u32,
    accumulated: Option<NewsResponse>,
    last_query: Option<String>,
    generation: u64,
}

impl Default for PagedQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl PagedQuery {
    pub fn new() -> Self {
        Self {
            page: 1,
            accumulated: None,
            last_query: None,
            generation: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn accumulated(&self) -> Option<&NewsResponse> {
        self.accumulated.as_ref()
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fold a freshly fetched page into the accumulation.
    pub fn merge(&mut self, page: NewsResponse) -> &NewsResponse {
        self.page += 1;
        let merged = match self.accumulated.take() {
            Some(mut acc) => {
                acc.append_page(page);
                acc
            }
            None => page,
        };
        self.accumulated.insert(merged)
    }

    /// Prepare for a search request. A query different from the last one
    /// starts over at page 1 with nothing accumulated. Returns whether a
    /// reset happened.
    pub fn begin_search(&mut self, query: &str) -> bool {
        if self.last_query.as_deref() == Some(query) {
            return false;
        }
        self.page = 1;
        self.accumulated = None;
        self.last_query = Some(query.to_string());
        self.generation = self.generation.wrapping_add(1);
        true
    }

    /// Whether a response requested at `generation` still belongs to this state.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Merge a search page, unless the state was reset since it was requested.
    pub fn merge_search(&mut self, generation: u64, page: NewsResponse) -> Option<&NewsResponse> {
        if !self.is_current(generation) {
            tracing::debug!(
                "dropping stale search page (generation {} != {})",
                generation,
                self.generation
            );
            return None;
        }
        Some(self.merge(page))
    }

    pub fn is_last_page(&self, page_size: u32) -> bool {
        self.accumulated
            .as_ref()
            .is_some_and(|acc| is_last_page(self.page, acc.total_results, page_size))
    }
}

/// Estimated page count. Over-estimates by one page so that a remote total
/// that undercounts still lets the final page load.
pub fn total_pages(total_results: u32, page_size: u32) -> u32 {
    total_results / page_size.max(1) + 2
}

pub fn is_last_page(page: u32, total_results: u32, page_size: u32) -> bool {
    page >= total_pages(total_results, page_size)
}

/// Viewport position of a list, in items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub first_visible: usize,
    pub visible_count: usize,
    pub total_count: usize,
}

/// List flags that block loading more.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFlags {
    pub is_error: bool,
    pub is_loading: bool,
    pub is_last_page: bool,
}

/// Whether scrolling to `metrics` should request the next page.
pub fn should_paginate(metrics: ScrollMetrics, flags: ListFlags, page_size: u32) -> bool {
    let at_last_item = metrics.first_visible + metrics.visible_count >= metrics.total_count;
    let more_than_a_page = metrics.total_count >= page_size as usize;

    !flags.is_error && !flags.is_loading && !flags.is_last_page && at_last_item && more_than_a_page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Article;

    fn page(prefix: &str, n: usize, total: u32) -> NewsResponse {
        let articles = (0..n)
            .map(|i| Article::new(format!("https://news/{}/{}", prefix, i)))
            .collect();
        NewsResponse::new(articles, total)
    }

    fn urls(resp: &NewsResponse) -> Vec<String> {
        resp.articles.iter().map(|a| a.url.clone()).collect()
    }

    #[test]
    fn test_first_merge_becomes_accumulation() {
        let mut state = PagedQuery::new();
        assert_eq!(state.page(), 1);
        assert!(state.accumulated().is_none());

        let first = page("a", 3, 60);
        assert_eq!(state.merge(first.clone()), &first);
        assert_eq!(state.page(), 2);
    }

    #[test]
    fn test_accumulation_is_concatenation_in_fetch_order() {
        let mut state = PagedQuery::new();
        let pages = [page("a", 20, 55), page("b", 20, 55), page("c", 15, 55)];

        let mut expected = Vec::new();
        for p in &pages {
            expected.extend(urls(p));
            state.merge(p.clone());
        }

        assert_eq!(urls(state.accumulated().unwrap()), expected);
        assert_eq!(state.page(), 4);
    }

    #[test]
    fn test_query_change_resets_page_and_accumulation() {
        let mut state = PagedQuery::new();
        assert!(state.begin_search("rust"));
        let generation = state.generation();
        state.merge_search(generation, page("r1", 20, 100)).unwrap();
        state.merge_search(generation, page("r2", 20, 100)).unwrap();
        assert_eq!(state.page(), 3);

        // same query keeps paging
        assert!(!state.begin_search("rust"));
        assert_eq!(state.generation(), generation);
        assert_eq!(state.page(), 3);

        assert!(state.begin_search("go"));
        assert_eq!(state.page(), 1);
        assert!(state.accumulated().is_none());
        assert_eq!(state.last_query(), Some("go"));
    }

    #[test]
    fn test_stale_search_page_is_dropped() {
        let mut state = PagedQuery::new();
        state.begin_search("rust");
        let rust = state.generation();
        state.begin_search("go");

        assert!(state.merge_search(rust, page("r", 5, 5)).is_none());
        assert_eq!(state.page(), 1);
        assert!(state.accumulated().is_none());
    }

    #[test]
    fn test_page_from_before_retyped_query_is_dropped() {
        let mut state = PagedQuery::new();
        state.begin_search("rust");
        let first = state.generation();
        state.begin_search("go");
        state.begin_search("rust");
        let second = state.generation();
        assert_ne!(first, second);

        assert!(state.merge_search(first, page("old", 20, 100)).is_none());
        let merged = state.merge_search(second, page("new", 20, 100)).unwrap();
        assert_eq!(merged.len(), 20);
        assert!(merged.articles.iter().all(|a| a.url.contains("/new/")));
        assert_eq!(state.page(), 2);
    }

    #[test]
    fn test_total_pages_formula() {
        assert_eq!(total_pages(18, 20), 2);
        assert_eq!(total_pages(20, 20), 3);
        assert_eq!(total_pages(0, 20), 2);
        assert_eq!(total_pages(95, 20), 6);
        // page size of zero is treated as one
        assert_eq!(total_pages(3, 0), 5);
    }

    #[test]
    fn test_last_page_after_first_fetch_of_small_result() {
        let mut state = PagedQuery::new();
        assert!(!state.is_last_page(20));

        state.merge(page("a", 18, 18));
        assert_eq!(state.page(), 2);
        assert!(state.is_last_page(20));
    }

    #[test]
    fn test_not_last_page_with_more_results() {
        let mut state = PagedQuery::new();
        state.merge(page("a", 20, 45));
        // 45 / 20 + 2 = 4
        assert!(!state.is_last_page(20));
        state.merge(page("b", 20, 45));
        assert!(!state.is_last_page(20));
        state.merge(page("c", 5, 45));
        assert!(state.is_last_page(20));
    }

    #[test]
    fn test_should_paginate_at_end_of_full_page() {
        let metrics = ScrollMetrics {
            first_visible: 12,
            visible_count: 8,
            total_count: 20,
        };
        assert!(should_paginate(metrics, ListFlags::default(), 20));
    }

    #[test]
    fn test_should_not_paginate_when_blocked() {
        let metrics = ScrollMetrics {
            first_visible: 12,
            visible_count: 8,
            total_count: 20,
        };
        let blocked = [
            ListFlags {
                is_error: true,
                ..Default::default()
            },
            ListFlags {
                is_loading: true,
                ..Default::default()
            },
            ListFlags {
                is_last_page: true,
                ..Default::default()
            },
        ];
        for flags in blocked {
            assert!(!should_paginate(metrics, flags, 20), "{:?}", flags);
        }
    }

    #[test]
    fn test_should_not_paginate_mid_list_or_short_list() {
        let mid = ScrollMetrics {
            first_visible: 0,
            visible_count: 8,
            total_count: 20,
        };
        assert!(!should_paginate(mid, ListFlags::default(), 20));

        let short = ScrollMetrics {
            first_visible: 0,
            visible_count: 10,
            total_count: 10,
        };
        assert!(!should_paginate(short, ListFlags::default(), 20));
    }
}
