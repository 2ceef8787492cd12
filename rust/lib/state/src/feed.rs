//! Paginated feed store.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use codegram_client::{ApiError, CodegramApi, FeedSource};
use codegram_types::{ContentItem, ContentKind, ItemPatch};

/// Items requested per page.
pub const FEED_PAGE_SIZE: u32 = 10;

const FIRST_PAGE: u32 = 1;

/// Snapshot of a feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    /// Arrival order. Never holds two items with the same id.
    pub items: Vec<ContentItem>,
    /// Next page to request.
    pub page: u32,
    /// Cleared once the server reports the end; only `reset` sets it again.
    pub has_more: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: FIRST_PAGE,
            has_more: true,
            is_loading: false,
            error: None,
        }
    }
}

/// What a `fetch_next` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Another fetch was in flight, or the feed is exhausted. No request.
    Skipped,
    /// A page arrived; `added` items survived de-duplication.
    Appended { added: usize },
    /// The store was reset while the request was in flight; the response
    /// was dropped.
    Stale,
}

/// Incrementally paginated feed.
///
/// - `fetch_next()` loads the next page; overlapping calls collapse into one
///   request.
/// - `reset()` starts a fresh sequence (view unmount).
/// - `patch_item()` / `prepend_item()` are the targeted update paths used by
///   the interaction controller and the push channel.
///
/// Every `reset` bumps an epoch. A response issued under an older epoch is
/// discarded, so a late answer can never leak into a fresh list.
pub struct FeedStore {
    api: Arc<dyn CodegramApi>,
    source: FeedSource,
    inner: RwLock<Inner>,
}

struct Inner {
    state: FeedState,
    epoch: u64,
}

impl FeedStore {
    pub fn new(api: Arc<dyn CodegramApi>, source: FeedSource) -> Self {
        Self {
            api,
            source,
            inner: RwLock::new(Inner { state: FeedState::default(), epoch: 0 }),
        }
    }

    pub fn source(&self) -> FeedSource {
        self.source
    }

    /// Load the next page.
    ///
    /// No-op while a fetch is in flight or once the feed is exhausted. On
    /// failure the cursor is left where it was, so the next call retries the
    /// same page; the error is both recorded in the state and returned.
    pub async fn fetch_next(&self) -> Result<FetchOutcome, ApiError> {
        let (page, epoch) = {
            let mut inner = self.inner.write();
            if !inner.state.has_more || inner.state.is_loading {
                return Ok(FetchOutcome::Skipped);
            }
            inner.state.is_loading = true;
            inner.state.error = None;
            (inner.state.page, inner.epoch)
        };

        let result = self.api.fetch_feed(self.source, page, FEED_PAGE_SIZE).await;

        let mut inner = self.inner.write();
        if inner.epoch != epoch {
            debug!(source = %self.source, page, "dropping feed page that resolved after reset");
            return Ok(FetchOutcome::Stale);
        }
        inner.state.is_loading = false;

        match result {
            Ok(batch) => {
                let received = batch.data.len();
                let mut seen: HashSet<String> =
                    inner.state.items.iter().map(|i| i.id().to_string()).collect();
                let fresh: Vec<ContentItem> = batch
                    .data
                    .into_iter()
                    .filter(|item| seen.insert(item.id().to_string()))
                    .collect();
                if fresh.len() < received {
                    debug!(
                        source = %self.source,
                        page,
                        dropped = received - fresh.len(),
                        "dropped duplicate feed items"
                    );
                }

                let added = fresh.len();
                let state = &mut inner.state;
                state.items.extend(fresh);
                state.page += 1;
                state.has_more = state.has_more && batch.has_more;
                Ok(FetchOutcome::Appended { added })
            }
            Err(e) => {
                warn!(source = %self.source, page, error = %e, "feed fetch failed");
                inner.state.error = Some(format!("Failed to fetch feed: {}", e));
                Err(e)
            }
        }
    }

    /// Drop everything and start over from the first page.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.state = FeedState::default();
        inner.epoch += 1;
    }

    /// Shallow-merge `patch` into the item with `id`. Returns `false` when
    /// the item is not (or no longer) in the feed.
    pub fn patch_item(&self, id: &str, patch: &ItemPatch) -> bool {
        let mut inner = self.inner.write();
        match inner.state.items.iter_mut().find(|i| i.id() == id) {
            Some(item) => {
                item.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Insert a real-time item at the head unless its id is already present.
    pub fn prepend_item(&self, item: ContentItem) -> bool {
        let mut inner = self.inner.write();
        if inner.state.items.iter().any(|i| i.id() == item.id()) {
            debug!(id = %item.id(), "ignoring duplicate real-time item");
            return false;
        }
        inner.state.items.insert(0, item);
        true
    }

    pub fn get(&self, id: &str) -> Option<ContentItem> {
        self.inner.read().state.items.iter().find(|i| i.id() == id).cloned()
    }

    pub fn snapshot(&self) -> FeedState {
        self.inner.read().state.clone()
    }

    /// Items of one kind, in feed order.
    pub fn items_of_kind(&self, kind: ContentKind) -> Vec<ContentItem> {
        self.inner
            .read()
            .state
            .items
            .iter()
            .filter(|i| i.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().state.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Incremented by every `reset`.
    pub fn epoch(&self) -> u64 {
        self.inner.read().epoch
    }
}
