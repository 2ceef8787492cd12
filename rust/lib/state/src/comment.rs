//! Comment thread of the item currently open.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use codegram_client::{ApiError, CodegramApi};
use codegram_types::{Comment, ContentRef, ItemPatch};

use crate::feed::FeedStore;

#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error("Comment cannot be empty")]
    Empty,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentState {
    /// Item whose thread is loaded.
    pub target: Option<ContentRef>,
    /// Newest first.
    pub comments: Vec<Comment>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Holds one thread at a time. Opening another item replaces it; a response
/// for a thread that is no longer open is dropped.
pub struct CommentStore {
    api: Arc<dyn CodegramApi>,
    feed: Option<Arc<FeedStore>>,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    state: CommentState,
    epoch: u64,
}

impl CommentStore {
    pub fn new(api: Arc<dyn CodegramApi>) -> Self {
        Self { api, feed: None, inner: RwLock::new(Inner::default()) }
    }

    /// New comments also bump `commentsCount` on the matching feed item.
    pub fn with_feed(api: Arc<dyn CodegramApi>, feed: Arc<FeedStore>) -> Self {
        Self { api, feed: Some(feed), inner: RwLock::new(Inner::default()) }
    }

    /// Load the thread for `target`. Returns `Ok(false)` if another `fetch`
    /// or a `clear` happened before the response arrived.
    pub async fn fetch(&self, target: &ContentRef) -> Result<bool, ApiError> {
        let epoch = {
            let mut inner = self.inner.write();
            inner.epoch += 1;
            if inner.state.target.as_ref() != Some(target) {
                inner.state.comments.clear();
                inner.state.target = Some(target.clone());
            }
            inner.state.is_loading = true;
            inner.state.error = None;
            inner.epoch
        };

        let result = self.api.fetch_comments(target).await;

        let mut inner = self.inner.write();
        if inner.epoch != epoch {
            debug!(kind = %target.kind, id = %target.id, "dropping comments for a closed thread");
            return Ok(false);
        }
        inner.state.is_loading = false;
        match result {
            Ok(comments) => {
                inner.state.comments = comments;
                Ok(true)
            }
            Err(e) => {
                warn!(kind = %target.kind, id = %target.id, error = %e, "comment fetch failed");
                inner.state.error = Some(format!("Failed to fetch comments: {}", e));
                Err(e)
            }
        }
    }

    /// Post a comment on `target`.
    ///
    /// Blank text is rejected before any request. On success the comment is
    /// prepended if `target`'s thread is open.
    pub async fn add(&self, target: &ContentRef, content: &str) -> Result<Comment, CommentError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(CommentError::Empty);
        }

        let comment = match self.api.add_comment(target, content).await {
            Ok(c) => c,
            Err(e) => {
                warn!(kind = %target.kind, id = %target.id, error = %e, "posting comment failed");
                self.inner.write().state.error = Some(format!("Failed to add comment: {}", e));
                return Err(e.into());
            }
        };

        {
            let mut inner = self.inner.write();
            if inner.state.target.as_ref() == Some(target) {
                inner.state.comments.insert(0, comment.clone());
            }
        }

        if let Some(feed) = &self.feed {
            if let Some(item) = feed.get(&target.id) {
                let count = item.engagement().comments_count.saturating_add(1);
                feed.patch_item(&target.id, &ItemPatch::comments_count(count));
            }
        }
        Ok(comment)
    }

    /// Close the open thread.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.state = CommentState::default();
        inner.epoch += 1;
    }

    pub fn snapshot(&self) -> CommentState {
        self.inner.read().state.clone()
    }
}
