//! Buffered pagination over the discover endpoint.
//!
//! The pager owns its page cursor, an overflow buffer of fetched but
//! undelivered items, and the delivered item sequence for the current
//! query. Nothing else reads or mutates that state; the buffer is only
//! touched through enqueue and drain. At most one page fetch is in
//! flight per instance, and every cycle is tied to a cancellation token
//! so stale responses for an abandoned query are never applied.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::DiscoverError;
use crate::filters::DiscoverFilters;
use crate::item::{SearchMediaItem, map_record};
use crate::keywords;
use crate::page::fetch_page;
use crate::transport::Transport;

/// Target size of the first delivered batch. Page 2 is fetched eagerly
/// when page 1 maps to fewer items, bounding initial round trips to two
/// even for sparse result sets.
pub const INITIAL_BATCH: usize = 30;
/// Batch size for each subsequent `load_more` delivery.
pub const LOAD_MORE_BATCH: usize = 18;

/// Observable request lifecycle of the pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagerStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Default)]
struct PagerState {
    /// Current page cursor, 0 before the first fetch.
    page: u32,
    /// Total page count reported upstream, 0 while unknown.
    total_pages: u32,
    buffer: VecDeque<SearchMediaItem>,
    keyword_ids: Vec<i64>,
}

impl PagerState {
    fn drain(&mut self, count: usize) -> Vec<SearchMediaItem> {
        let take = count.min(self.buffer.len());
        self.buffer.drain(..take).collect()
    }

    fn has_unfetched_pages(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Cursor over the discover endpoint with an overflow buffer and
/// fixed-size delivery batches.
pub struct DiscoverPager {
    transport: Arc<dyn Transport>,
    debounce: Duration,

    filters: DiscoverFilters,
    /// Signature of the last cycle that ran to completion. Committed
    /// only after the cycle's final await, so an abandoned seed never
    /// records a signature for results it never loaded.
    signature: String,
    state: PagerState,
    active: Option<CancellationToken>,

    status: PagerStatus,
    error: String,
    items: Vec<SearchMediaItem>,
    has_more: bool,
}

impl DiscoverPager {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            debounce: Duration::ZERO,
            filters: DiscoverFilters::default(),
            signature: String::new(),
            state: PagerState::default(),
            active: None,
            status: PagerStatus::Idle,
            error: String::new(),
            items: Vec::new(),
            has_more: false,
        }
    }

    /// Delays the start of each seed by `debounce`, raced against the
    /// cycle's cancellation token.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn status(&self) -> PagerStatus {
        self.status
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn items(&self) -> &[SearchMediaItem] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn filters(&self) -> &DiscoverFilters {
        &self.filters
    }

    /// Cancels any in-flight work (consumer unmount). Prior state stays
    /// as it was; no status transition happens on behalf of the
    /// cancelled cycle.
    pub fn cancel(&mut self) {
        if let Some(token) = &self.active {
            token.cancel();
        }
    }

    /// Seeds only when the filter signature actually changed, so filter
    /// values that differ in array order or whitespace alone never
    /// trigger a refetch.
    pub async fn ensure(&mut self, filters: DiscoverFilters) {
        let signature = filters.signature();
        // Methods hold exclusive access for a whole cycle, so seeing
        // Loading here means a previous cycle's future was dropped
        // before it could finish. Reseed rather than wait for a
        // completion that will never come.
        let stale = matches!(self.status, PagerStatus::Idle | PagerStatus::Loading);
        if signature == self.signature && !stale {
            return;
        }
        self.seed(filters).await;
    }

    /// Resets all pager state for the new filters and loads the initial
    /// batch.
    pub async fn seed(&mut self, filters: DiscoverFilters) {
        let token = self.begin_cycle();
        let signature = filters.signature();
        self.filters = filters;

        if !self.debounce.is_zero() {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(self.debounce) => {}
            }
        }

        debug!(kind = self.filters.media_kind.as_str(), "seeding discover pager");
        self.state = PagerState::default();
        self.items.clear();
        self.error.clear();
        self.has_more = false;
        self.status = PagerStatus::Loading;

        match self.seed_inner(&token).await {
            Ok(()) => self.signature = signature,
            Err(DiscoverError::Cancelled) => {}
            Err(err) => {
                warn!(error = %err, "discover seed failed");
                self.error = err.to_string();
                self.status = PagerStatus::Error;
                self.signature = signature;
            }
        }
    }

    /// Forces a full reseed of the current filters, the manual retry
    /// path after an error.
    pub async fn refetch(&mut self) {
        let filters = self.filters.clone();
        self.seed(filters).await;
    }

    /// Delivers the next batch, fetching the next page first when the
    /// buffer cannot cover it. The buffer is drained only after any
    /// fetch has succeeded, so a failed, cancelled, or abandoned fetch
    /// loses no buffered items and a retry delivers all of them.
    pub async fn load_more(&mut self) {
        if self.status == PagerStatus::Loading || !self.has_more {
            return;
        }
        let Some(token) = self.active.clone() else {
            return;
        };

        if self.state.buffer.len() < LOAD_MORE_BATCH && self.state.has_unfetched_pages() {
            let next_page = self.state.page + 1;
            let result = fetch_page(
                self.transport.as_ref(),
                &self.filters,
                next_page,
                &self.state.keyword_ids,
                &token,
            )
            .await;

            match result {
                Ok(data) => {
                    self.state.page = data.page;
                    self.state.total_pages = data.total_pages;
                    let kind = self.filters.media_kind;
                    self.state
                        .buffer
                        .extend(data.results.iter().filter_map(|r| map_record(kind, r)));
                }
                // Cancelled cycle: nothing was drained, nothing to undo.
                Err(DiscoverError::Cancelled) => return,
                Err(err) => {
                    warn!(error = %err, page = next_page, "discover load-more failed");
                    self.error = err.to_string();
                    self.status = PagerStatus::Error;
                    return;
                }
            }
        }

        let batch = self.state.drain(LOAD_MORE_BATCH);
        self.items.extend(batch);
        self.recompute_has_more();
        self.error.clear();
        self.status = PagerStatus::Success;
    }

    async fn seed_inner(&mut self, token: &CancellationToken) -> Result<(), DiscoverError> {
        self.state.keyword_ids =
            keywords::resolve(self.transport.as_ref(), &self.filters.keywords, token).await?;

        let first = fetch_page(
            self.transport.as_ref(),
            &self.filters,
            1,
            &self.state.keyword_ids,
            token,
        )
        .await?;
        self.state.page = first.page;
        self.state.total_pages = first.total_pages;

        let kind = self.filters.media_kind;
        let mut raw_count = first.results.len();
        let mut mapped: Vec<SearchMediaItem> = first
            .results
            .iter()
            .filter_map(|r| map_record(kind, r))
            .collect();

        if mapped.len() < INITIAL_BATCH && first.total_pages >= 2 {
            let second = fetch_page(
                self.transport.as_ref(),
                &self.filters,
                2,
                &self.state.keyword_ids,
                token,
            )
            .await?;
            self.state.page = second.page;
            self.state.total_pages = second.total_pages;
            raw_count += second.results.len();
            mapped.extend(second.results.iter().filter_map(|r| map_record(kind, r)));
        }

        // Records came back but every one was unusable: the response is
        // garbage, not a legitimately empty result set.
        if raw_count > 0 && mapped.is_empty() {
            return Err(DiscoverError::BadData);
        }

        self.state.buffer = mapped.into();
        self.items = self.state.drain(INITIAL_BATCH);
        self.recompute_has_more();
        self.status = PagerStatus::Success;
        Ok(())
    }

    fn recompute_has_more(&mut self) {
        self.has_more = !self.state.buffer.is_empty() || self.state.has_unfetched_pages();
    }

    fn begin_cycle(&mut self) -> CancellationToken {
        if let Some(previous) = self.active.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        self.active = Some(token.clone());
        token
    }
}
