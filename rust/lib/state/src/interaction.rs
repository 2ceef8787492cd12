//! Optimistic like/bookmark toggles.
//!
//! Each (item, kind) pair is a small state machine:
//!
//! ```text
//! Idle(v, n) --toggle--> Pending(!v, n±1) --ok(s)--> Idle(s)
//!                                        \--err---> Idle(v, n)
//! ```
//!
//! The optimistic value is written into the feed immediately. A confirmed
//! toggle replaces both fields with the server's post-toggle pair, so the
//! counter cannot drift; a failed one writes back the exact snapshot taken
//! before the flip. A toggle whose future is dropped mid-request is treated
//! like a failed one.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use codegram_client::{ApiError, CodegramApi};
use codegram_types::{InteractionKind, ItemPatch, ToggleState};

use crate::feed::FeedStore;

#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    #[error("item {0} is not in the feed")]
    UnknownItem(String),
}

/// How a toggle ended.
#[derive(Debug)]
pub enum ToggleOutcome {
    /// The server accepted the toggle; this pair is now in the feed.
    Confirmed(ToggleState),
    /// The server rejected the toggle and the pre-toggle pair was restored.
    RolledBack { restored: ToggleState, error: ApiError },
    /// A toggle for the same item and kind was still pending. Nothing
    /// changed and no request was sent.
    Ignored,
}

struct PendingToggle {
    snapshot: ToggleState,
    epoch: u64,
}

type PendingKey = (String, InteractionKind);

/// Owns one entry of the pending table while its request is in flight.
///
/// Dropping an unfinished guard returns the pair to Idle: the entry is
/// removed and the snapshot written back if the feed was not reset.
struct PendingGuard<'a> {
    ctl: &'a InteractionController,
    key: PendingKey,
    done: bool,
}

impl PendingGuard<'_> {
    fn finish(mut self) -> Option<PendingToggle> {
        self.done = true;
        self.ctl.pending.lock().remove(&self.key)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let Some(entry) = self.ctl.pending.lock().remove(&self.key) else {
            return;
        };
        let (item_id, kind) = &self.key;
        debug!(item = %item_id, %kind, "toggle abandoned; restoring snapshot");
        self.ctl.restore(item_id, *kind, &entry);
    }
}

pub struct InteractionController {
    api: Arc<dyn CodegramApi>,
    feed: Arc<FeedStore>,
    pending: Mutex<HashMap<PendingKey, PendingToggle>>,
}

impl InteractionController {
    pub fn new(api: Arc<dyn CodegramApi>, feed: Arc<FeedStore>) -> Self {
        Self { api, feed, pending: Mutex::new(HashMap::new()) }
    }

    /// Toggle `kind` on the feed item `item_id`.
    ///
    /// Rollback is recovery, not failure: a rejected toggle still returns
    /// `Ok(ToggleOutcome::RolledBack { .. })`.
    pub async fn toggle(
        &self,
        item_id: &str,
        kind: InteractionKind,
    ) -> Result<ToggleOutcome, InteractionError> {
        let key = (item_id.to_string(), kind);

        let (target, optimistic) = {
            let mut pending = self.pending.lock();
            if pending.contains_key(&key) {
                debug!(item = %item_id, %kind, "toggle already pending; ignoring");
                return Ok(ToggleOutcome::Ignored);
            }
            let item = self
                .feed
                .get(item_id)
                .ok_or_else(|| InteractionError::UnknownItem(item_id.to_string()))?;
            let snapshot = item.engagement().toggle_state(kind);
            let optimistic = snapshot.flipped();

            pending.insert(key.clone(), PendingToggle { snapshot, epoch: self.feed.epoch() });
            self.feed.patch_item(item_id, &ItemPatch::from_toggle(kind, optimistic));
            (item.content_ref(), optimistic)
        };
        let guard = PendingGuard { ctl: self, key, done: false };
        debug!(item = %item_id, %kind, active = optimistic.active, count = optimistic.count, "optimistic toggle");

        let result = self.api.toggle(kind, &target).await;

        let Some(entry) = guard.finish() else {
            return Ok(ToggleOutcome::Ignored);
        };

        match result {
            Ok(confirmed) => {
                self.feed.patch_item(item_id, &ItemPatch::from_toggle(kind, confirmed));
                Ok(ToggleOutcome::Confirmed(confirmed))
            }
            Err(error) => {
                warn!(item = %item_id, %kind, error = %error, "toggle rejected; rolling back");
                self.restore(item_id, kind, &entry);
                Ok(ToggleOutcome::RolledBack { restored: entry.snapshot, error })
            }
        }
    }

    fn restore(&self, item_id: &str, kind: InteractionKind, entry: &PendingToggle) {
        if self.feed.epoch() == entry.epoch {
            self.feed.patch_item(item_id, &ItemPatch::from_toggle(kind, entry.snapshot));
        } else {
            debug!(item = %item_id, "feed was reset; skipping rollback");
        }
    }

    pub fn is_pending(&self, item_id: &str, kind: InteractionKind) -> bool {
        self.pending.lock().contains_key(&(item_id.to_string(), kind))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use codegram_client::FeedSource;
    use codegram_types::Engagement;

    fn setup(items: Vec<codegram_types::ContentItem>) -> (Arc<FakeApi>, Arc<FeedStore>, Arc<InteractionController>) {
        let api = Arc::new(FakeApi::new());
        let feed = Arc::new(FeedStore::new(api.clone(), FeedSource::Home));
        for item in items.into_iter().rev() {
            feed.prepend_item(item);
        }
        let ctl = Arc::new(InteractionController::new(api.clone(), feed.clone()));
        (api, feed, ctl)
    }

    fn like_state(feed: &FeedStore, id: &str) -> ToggleState {
        feed.get(id).unwrap().engagement().toggle_state(InteractionKind::Like)
    }

    // ========================================================================
    // Confirm
    // ========================================================================

    #[tokio::test]
    async fn confirmed_like_keeps_optimistic_state() {
        let (api, feed, ctl) = setup(vec![liked("x", false, 5)]);
        api.hold();
        api.toggles.lock().push_back(Ok(ToggleState::new(true, 6)));

        let task = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.toggle("x", InteractionKind::Like).await }
        });
        api.wait_for_calls("toggle", 1).await;

        assert_eq!(like_state(&feed, "x"), ToggleState::new(true, 6));
        assert!(ctl.is_pending("x", InteractionKind::Like));

        api.release(1);
        let outcome = task.await.unwrap().unwrap();
        assert!(matches!(outcome, ToggleOutcome::Confirmed(s) if s == ToggleState::new(true, 6)));
        assert_eq!(like_state(&feed, "x"), ToggleState::new(true, 6));
        assert!(!ctl.is_pending("x", InteractionKind::Like));
        assert_eq!(api.requests(), vec!["like snippet:x"]);
    }

    #[tokio::test]
    async fn confirmation_replaces_optimistic_guess() {
        // Another device liked the item meanwhile: the server count wins.
        let (api, feed, ctl) = setup(vec![liked("x", false, 5)]);
        api.toggles.lock().push_back(Ok(ToggleState::new(true, 9)));

        ctl.toggle("x", InteractionKind::Like).await.unwrap();

        assert_eq!(like_state(&feed, "x"), ToggleState::new(true, 9));
    }

    #[tokio::test]
    async fn unlike_decrements_optimistically() {
        let (api, feed, ctl) = setup(vec![liked("x", true, 1)]);
        api.hold();
        api.toggles.lock().push_back(Ok(ToggleState::new(false, 0)));

        let task = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.toggle("x", InteractionKind::Like).await }
        });
        api.wait_for_calls("toggle", 1).await;
        assert_eq!(like_state(&feed, "x"), ToggleState::new(false, 0));

        api.release(1);
        task.await.unwrap().unwrap();
        assert_eq!(like_state(&feed, "x"), ToggleState::new(false, 0));
    }

    #[tokio::test]
    async fn bookmark_leaves_like_fields_alone() {
        let item = snippet(
            "x",
            Engagement { is_liked: true, likes_count: 3, bookmarks_count: 1, ..Default::default() },
        );
        let (api, feed, ctl) = setup(vec![item]);
        api.toggles.lock().push_back(Ok(ToggleState::new(true, 2)));

        ctl.toggle("x", InteractionKind::Bookmark).await.unwrap();

        let e = *feed.get("x").unwrap().engagement();
        assert!(e.is_bookmarked);
        assert_eq!(e.bookmarks_count, 2);
        assert!(e.is_liked);
        assert_eq!(e.likes_count, 3);
        assert_eq!(api.requests(), vec!["bookmark snippet:x"]);
    }

    // ========================================================================
    // Rollback
    // ========================================================================

    #[tokio::test]
    async fn rejected_like_restores_snapshot() {
        let (api, feed, ctl) = setup(vec![liked("x", false, 5)]);
        api.toggles.lock().push_back(Err(server_error()));

        let outcome = ctl.toggle("x", InteractionKind::Like).await.unwrap();

        match outcome {
            ToggleOutcome::RolledBack { restored, error } => {
                assert_eq!(restored, ToggleState::new(false, 5));
                assert_eq!(error.status(), Some(500));
            }
            other => panic!("expected rollback, got {:?}", other),
        }
        assert_eq!(like_state(&feed, "x"), ToggleState::new(false, 5));
        assert_eq!(ctl.pending_count(), 0);
    }

    #[tokio::test]
    async fn zero_count_unlike_rolls_back_exactly() {
        // Inconsistent server data (liked with zero likes) must not underflow.
        let (api, feed, ctl) = setup(vec![liked("x", true, 0)]);
        api.toggles.lock().push_back(Err(server_error()));

        ctl.toggle("x", InteractionKind::Like).await.unwrap();

        assert_eq!(like_state(&feed, "x"), ToggleState::new(true, 0));
    }

    #[tokio::test]
    async fn rollback_skipped_after_feed_reset() {
        let (api, feed, ctl) = setup(vec![liked("x", false, 5)]);
        api.hold();
        api.toggles.lock().push_back(Err(server_error()));

        let task = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.toggle("x", InteractionKind::Like).await }
        });
        api.wait_for_calls("toggle", 1).await;

        feed.reset();
        feed.prepend_item(liked("x", true, 7));
        api.release(1);

        let outcome = task.await.unwrap().unwrap();
        assert!(matches!(outcome, ToggleOutcome::RolledBack { .. }));
        assert_eq!(like_state(&feed, "x"), ToggleState::new(true, 7));
    }

    // ========================================================================
    // Re-entrancy
    // ========================================================================

    #[tokio::test]
    async fn second_toggle_while_pending_is_ignored() {
        let (api, feed, ctl) = setup(vec![liked("x", false, 5)]);
        api.hold();
        api.toggles.lock().push_back(Ok(ToggleState::new(true, 6)));

        let first = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.toggle("x", InteractionKind::Like).await }
        });
        api.wait_for_calls("toggle", 1).await;

        let second = ctl.toggle("x", InteractionKind::Like).await.unwrap();
        assert!(matches!(second, ToggleOutcome::Ignored));
        assert_eq!(like_state(&feed, "x"), ToggleState::new(true, 6));

        api.release(1);
        first.await.unwrap().unwrap();
        assert_eq!(api.calls("toggle"), 1);
        assert_eq!(like_state(&feed, "x"), ToggleState::new(true, 6));
    }

    #[tokio::test]
    async fn different_kinds_toggle_independently() {
        let (api, _feed, ctl) = setup(vec![liked("x", false, 5)]);
        api.hold();
        api.toggles.lock().push_back(Ok(ToggleState::new(true, 6)));
        api.toggles.lock().push_back(Ok(ToggleState::new(true, 1)));

        let like = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.toggle("x", InteractionKind::Like).await }
        });
        api.wait_for_calls("toggle", 1).await;
        let bookmark = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.toggle("x", InteractionKind::Bookmark).await }
        });
        api.wait_for_calls("toggle", 2).await;
        assert_eq!(ctl.pending_count(), 2);

        api.release(2);
        like.await.unwrap().unwrap();
        bookmark.await.unwrap().unwrap();
        assert_eq!(ctl.pending_count(), 0);
    }

    #[tokio::test]
    async fn toggle_after_resolution_is_accepted_again() {
        let (api, feed, ctl) = setup(vec![liked("x", false, 5)]);
        api.toggles.lock().push_back(Ok(ToggleState::new(true, 6)));
        api.toggles.lock().push_back(Ok(ToggleState::new(false, 5)));

        ctl.toggle("x", InteractionKind::Like).await.unwrap();
        ctl.toggle("x", InteractionKind::Like).await.unwrap();

        assert_eq!(like_state(&feed, "x"), ToggleState::new(false, 5));
        assert_eq!(api.calls("toggle"), 2);
    }

    #[tokio::test]
    async fn unknown_item_is_an_error() {
        let (api, _feed, ctl) = setup(vec![]);

        let err = ctl.toggle("missing", InteractionKind::Like).await.unwrap_err();

        assert!(matches!(err, InteractionError::UnknownItem(id) if id == "missing"));
        assert_eq!(api.calls("toggle"), 0);
        assert_eq!(ctl.pending_count(), 0);
    }

    // ========================================================================
    // Abandoned toggles
    // ========================================================================

    #[tokio::test]
    async fn aborted_toggle_restores_snapshot_and_frees_the_pair() {
        let (api, feed, ctl) = setup(vec![liked("x", false, 5)]);
        api.hold();
        api.toggles.lock().push_back(Ok(ToggleState::new(true, 6)));

        let task = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.toggle("x", InteractionKind::Like).await }
        });
        api.wait_for_calls("toggle", 1).await;
        assert_eq!(like_state(&feed, "x"), ToggleState::new(true, 6));

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        assert_eq!(ctl.pending_count(), 0);
        assert_eq!(like_state(&feed, "x"), ToggleState::new(false, 5));

        api.release(1);
        let outcome = ctl.toggle("x", InteractionKind::Like).await.unwrap();
        assert!(matches!(outcome, ToggleOutcome::Confirmed(s) if s == ToggleState::new(true, 6)));
        assert_eq!(api.calls("toggle"), 2);
    }

    #[tokio::test]
    async fn aborted_toggle_across_reset_leaves_fresh_item_alone() {
        let (api, feed, ctl) = setup(vec![liked("x", false, 5)]);
        api.hold();
        api.toggles.lock().push_back(Ok(ToggleState::new(true, 6)));

        let task = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.toggle("x", InteractionKind::Like).await }
        });
        api.wait_for_calls("toggle", 1).await;
        feed.reset();
        feed.prepend_item(liked("x", true, 9));

        task.abort();
        let _ = task.await;

        assert!(!ctl.is_pending("x", InteractionKind::Like));
        assert_eq!(like_state(&feed, "x"), ToggleState::new(true, 9));

        api.release(1);
        let outcome = ctl.toggle("x", InteractionKind::Like).await.unwrap();
        assert!(matches!(outcome, ToggleOutcome::Confirmed(_)));
        assert_eq!(api.calls("toggle"), 2);
    }
}
