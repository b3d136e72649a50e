//! Cursor-driven pagination over one search query, with run-wide dedup.
//!
//! The paginator issues a search without a cursor, yields every stub whose
//! `place_id` has not been seen in the current run, then follows the
//! continuation cursor until a page arrives without one. Stubs are produced
//! lazily: the next page is only requested once the consumer has taken
//! every new stub of the current page.

use std::collections::HashSet;

use async_stream::stream;
use futures::Stream;

use crate::models::{Lookup, PlaceStub};
use crate::services::PlaceSearch;

/// Place identifiers already handed out during one run.
///
/// Grows monotonically and is dropped with the run.
#[derive(Debug, Default)]
pub struct SeenPlaceIds {
    ids: HashSet<String>,
}

impl SeenPlaceIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `place_id`, returning `true` if it had not been seen before.
    pub fn insert_new(&mut self, place_id: &str) -> bool {
        if self.ids.contains(place_id) {
            return false;
        }
        self.ids.insert(place_id.to_owned())
    }
}

/// Drives every page of one query and filters out already-seen places.
pub struct DeduplicatingPaginator<'a> {
    client: &'a dyn PlaceSearch,
    query: &'a str,
    seen: &'a mut SeenPlaceIds,
    max_pages: Option<usize>,
}

impl<'a> DeduplicatingPaginator<'a> {
    pub fn new(client: &'a dyn PlaceSearch, query: &'a str, seen: &'a mut SeenPlaceIds) -> Self {
        Self {
            client,
            query,
            seen,
            max_pages: None,
        }
    }

    /// Stops following cursors after `max_pages` pages. `None` is unbounded.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Lazy, finite sequence of stubs not seen earlier in the run.
    pub fn new_places(self) -> impl Stream<Item = PlaceStub> + Send + 'a {
        let Self {
            client,
            query,
            seen,
            max_pages,
        } = self;

        stream! {
            let mut cursor: Option<String> = None;
            let mut page_count = 0usize;

            loop {
                page_count += 1;

                let lookup = client.search(query, cursor.as_deref()).await;
                if let Lookup::Unavailable { reason } = &lookup {
                    tracing::debug!(
                        "Page {} of '{}' unavailable, ending query: {}",
                        page_count,
                        query,
                        reason
                    );
                }
                let page = lookup.unwrap_or_empty();

                tracing::debug!(
                    "Page {} of '{}': {} result(s), more={}",
                    page_count,
                    query,
                    page.results.len(),
                    page.next_page_token.is_some()
                );

                for stub in page.results {
                    // Check-and-insert before yielding so an id is never handed out twice
                    if !seen.insert_new(&stub.place_id) {
                        tracing::debug!("Skipping already seen place {}", stub.place_id);
                        continue;
                    }
                    yield stub;
                }

                match page.next_page_token {
                    Some(next) => {
                        if max_pages.is_some_and(|cap| page_count >= cap) {
                            tracing::warn!(
                                "Page cap of {} reached for '{}', dropping remaining pages",
                                page_count,
                                query
                            );
                            break;
                        }
                        cursor = Some(next);
                    }
                    None => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchPage;
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves scripted pages keyed by (query, cursor) and records each call.
    #[derive(Default)]
    struct ScriptedSearch {
        pages: HashMap<(String, Option<String>), SearchPage>,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl ScriptedSearch {
        fn page(mut self, query: &str, cursor: Option<&str>, ids: &[&str], next: Option<&str>) -> Self {
            self.pages.insert(
                (query.to_string(), cursor.map(str::to_string)),
                SearchPage {
                    results: ids.iter().map(|id| PlaceStub::new(*id)).collect(),
                    next_page_token: next.map(str::to_string),
                },
            );
            self
        }

        fn calls(&self) -> Vec<(String, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PlaceSearch for ScriptedSearch {
        async fn search(&self, query: &str, cursor: Option<&str>) -> Lookup<SearchPage> {
            let key = (query.to_string(), cursor.map(str::to_string));
            self.calls.lock().unwrap().push(key.clone());
            match self.pages.get(&key) {
                Some(page) => Lookup::Found(page.clone()),
                None => Lookup::Unavailable {
                    reason: "no scripted page".to_string(),
                },
            }
        }
    }

    async fn collect_ids(paginator: DeduplicatingPaginator<'_>) -> Vec<String> {
        paginator
            .new_places()
            .map(|stub| stub.place_id)
            .collect::<Vec<_>>()
            .await
    }

    #[tokio::test]
    async fn test_single_page_without_cursor_issues_one_request() {
        let search = ScriptedSearch::default().page("cafe Lisbon", None, &["a", "b"], None);
        let mut seen = SeenPlaceIds::new();

        let ids = collect_ids(DeduplicatingPaginator::new(&search, "cafe Lisbon", &mut seen)).await;

        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(search.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_follows_cursors_until_exhausted() {
        let search = ScriptedSearch::default()
            .page("cafe Lisbon", None, &["a"], Some("t1"))
            .page("cafe Lisbon", Some("t1"), &["b"], Some("t2"))
            .page("cafe Lisbon", Some("t2"), &["c"], None);
        let mut seen = SeenPlaceIds::new();

        let ids = collect_ids(DeduplicatingPaginator::new(&search, "cafe Lisbon", &mut seen)).await;

        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(
            search.calls(),
            vec![
                ("cafe Lisbon".to_string(), None),
                ("cafe Lisbon".to_string(), Some("t1".to_string())),
                ("cafe Lisbon".to_string(), Some("t2".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicates_within_page_are_yielded_once() {
        let search = ScriptedSearch::default().page("spa Porto", None, &["x", "x", "y"], None);
        let mut seen = SeenPlaceIds::new();

        let ids = collect_ids(DeduplicatingPaginator::new(&search, "spa Porto", &mut seen)).await;

        assert_eq!(ids, vec!["x", "y"]);
        assert!(!seen.insert_new("x"));
        assert!(!seen.insert_new("y"));
    }

    #[tokio::test]
    async fn test_seen_set_is_shared_across_queries() {
        let search = ScriptedSearch::default()
            .page("spa Porto", None, &["x", "y"], None)
            .page("yoga studio Porto", None, &["y", "z"], None);
        let mut seen = SeenPlaceIds::new();

        let first = collect_ids(DeduplicatingPaginator::new(&search, "spa Porto", &mut seen)).await;
        let second =
            collect_ids(DeduplicatingPaginator::new(&search, "yoga studio Porto", &mut seen)).await;

        assert_eq!(first, vec!["x", "y"]);
        assert_eq!(second, vec!["z"]);
    }

    #[tokio::test]
    async fn test_unavailable_page_ends_query() {
        // Second page is not scripted, so it comes back unavailable
        let search = ScriptedSearch::default().page("hotel Faro", None, &["a"], Some("t1"));
        let mut seen = SeenPlaceIds::new();

        let ids = collect_ids(DeduplicatingPaginator::new(&search, "hotel Faro", &mut seen)).await;

        assert_eq!(ids, vec!["a"]);
        assert_eq!(search.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_page_cap_stops_following_cursors() {
        let search = ScriptedSearch::default()
            .page("bakery Braga", None, &["a"], Some("t1"))
            .page("bakery Braga", Some("t1"), &["b"], Some("t2"))
            .page("bakery Braga", Some("t2"), &["c"], None);
        let mut seen = SeenPlaceIds::new();

        let ids = collect_ids(
            DeduplicatingPaginator::new(&search, "bakery Braga", &mut seen).with_max_pages(Some(2)),
        )
        .await;

        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(search.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_next_page_waits_for_consumer() {
        let search = ScriptedSearch::default()
            .page("cafe Lisbon", None, &["a"], Some("t1"))
            .page("cafe Lisbon", Some("t1"), &["b"], None);
        let mut seen = SeenPlaceIds::new();

        {
            let places = DeduplicatingPaginator::new(&search, "cafe Lisbon", &mut seen).new_places();
            futures::pin_mut!(places);
            assert_eq!(places.next().await.map(|s| s.place_id), Some("a".to_string()));
        }

        assert_eq!(search.calls().len(), 1);
    }

    #[test]
    fn test_insert_new_reports_first_sighting_only() {
        let mut seen = SeenPlaceIds::new();
        assert!(seen.insert_new("abc"));
        assert!(!seen.insert_new("abc"));
        assert!(seen.insert_new("abd"));
    }
}
