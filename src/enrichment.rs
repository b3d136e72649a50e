/// Lead generation workflow shared by the HTTP handlers and tests
///
/// One run, for one (category, city):
/// 1. Expand the category into search queries
/// 2. Page through each query, skipping places already seen in the run
/// 3. Fetch details for every new place
/// 4. Emit a lead for each place with a phone number
/// 5. Emit a progress tick once a query is fully drained
use crate::catalog::CategoryCatalog;
use crate::errors::AppError;
use crate::models::{LeadEvent, LeadRecord};
use crate::paginator::{DeduplicatingPaginator, SeenPlaceIds};
use crate::services::{PlaceDetails, PlaceSearch};
use async_stream::stream;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

/// Lazy sequence of lead and progress events for one run.
///
/// Nothing is fetched until the stream is polled, and dropping it stops the
/// run at the next suspension point.
pub type LeadStream = Pin<Box<dyn Stream<Item = LeadEvent> + Send + 'static>>;

/// Percentage of `total` queries covered after `done` of them, rounded down.
pub fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = done.min(total);
    // done <= total, so the quotient is at most 100
    (done * 100 / total) as u8
}

#[derive(Debug, Default)]
struct RunStats {
    places: usize,
    leads: usize,
    without_phone: usize,
    details_unavailable: usize,
}

/// Orchestrates query expansion, pagination, enrichment and emission.
#[derive(Clone)]
pub struct LeadPipeline {
    catalog: Arc<CategoryCatalog>,
    search: Arc<dyn PlaceSearch>,
    details: Arc<dyn PlaceDetails>,
    max_pages_per_query: Option<usize>,
}

impl LeadPipeline {
    pub fn new(
        catalog: Arc<CategoryCatalog>,
        search: Arc<dyn PlaceSearch>,
        details: Arc<dyn PlaceDetails>,
    ) -> Self {
        Self {
            catalog,
            search,
            details,
            max_pages_per_query: None,
        }
    }

    /// Caps the number of pages followed per query. `None` is unbounded.
    #[must_use]
    pub fn with_max_pages_per_query(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages_per_query = max_pages;
        self
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    /// Starts a run for `category` in `city`.
    ///
    /// Input is validated up front: an unknown category or empty city fails
    /// with [`AppError::InvalidInput`] before any upstream call is made. The
    /// returned stream emits leads in discovery order, one progress event per
    /// query, and ends after the last query's progress event.
    pub fn run(&self, category: &str, city: &str) -> Result<LeadStream, AppError> {
        let queries = self.catalog.expand(category, city)?;
        let run_id = Uuid::new_v4();
        let total = queries.len();

        tracing::info!(
            "Run {} started: category='{}' city='{}' queries={}",
            run_id,
            category,
            city,
            total
        );

        let category = category.to_string();
        let search = Arc::clone(&self.search);
        let details = Arc::clone(&self.details);
        let max_pages = self.max_pages_per_query;

        let events: LeadStream = Box::pin(stream! {
            let mut seen = SeenPlaceIds::new();
            let mut stats = RunStats::default();

            for (index, query) in queries.iter().enumerate() {
                tracing::debug!("Run {} query {}/{}: '{}'", run_id, index + 1, total, query);

                let places = DeduplicatingPaginator::new(search.as_ref(), query, &mut seen)
                    .with_max_pages(max_pages)
                    .new_places();
                futures::pin_mut!(places);

                while let Some(stub) = places.next().await {
                    stats.places += 1;

                    let lookup = details.fetch_detail(&stub.place_id).await;
                    if lookup.is_unavailable() {
                        stats.details_unavailable += 1;
                    }

                    match LeadRecord::from_detail(&category, lookup.unwrap_or_empty()) {
                        Some(lead) => {
                            stats.leads += 1;
                            yield LeadEvent::Lead(lead);
                        }
                        None => {
                            stats.without_phone += 1;
                            tracing::debug!("Place {} has no phone, skipped", stub.place_id);
                        }
                    }
                }

                yield LeadEvent::Progress(progress_percent(index + 1, total));
            }

            tracing::info!(
                "Run {} complete: {} place(s), {} lead(s), {} without phone, {} detail lookup(s) unavailable",
                run_id,
                stats.places,
                stats.leads,
                stats.without_phone,
                stats.details_unavailable
            );
        });

        Ok(events)
    }
}
