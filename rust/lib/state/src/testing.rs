//! Scripted `CodegramApi` fake and fixture builders for store tests.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

use codegram_client::{ApiError, CodegramApi, FeedSource};
use codegram_types::{
    Comment, ContentBase, ContentItem, ContentRef, Engagement, FeedPage, FollowStatus,
    InteractionKind, Notification, NotificationKind, NotificationList, Snippet, ToggleState, User,
};

/// Fake API: each endpoint answers from its own FIFO script. An unscripted
/// call fails with HTTP 500. With `hold()` every call parks until
/// `release()` hands out a permit, which lets tests interleave store
/// operations with an in-flight request.
pub struct FakeApi {
    pub user: Mutex<Option<User>>,
    pub feed: Mutex<VecDeque<Result<FeedPage, ApiError>>>,
    pub toggles: Mutex<VecDeque<Result<ToggleState, ApiError>>>,
    pub notifications: Mutex<VecDeque<Result<NotificationList, ApiError>>>,
    pub mark_read: Mutex<VecDeque<Result<(), ApiError>>>,
    pub comments: Mutex<VecDeque<Result<Vec<Comment>, ApiError>>>,
    pub new_comments: Mutex<VecDeque<Result<Comment, ApiError>>>,
    pub follows: Mutex<VecDeque<Result<FollowStatus, ApiError>>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    requests: Mutex<Vec<String>>,
    held: Mutex<bool>,
    gate: Semaphore,
}

pub fn server_error() -> ApiError {
    ApiError::Server { status: 500, message: "boom".into() }
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            user: Mutex::new(None),
            feed: Mutex::new(VecDeque::new()),
            toggles: Mutex::new(VecDeque::new()),
            notifications: Mutex::new(VecDeque::new()),
            mark_read: Mutex::new(VecDeque::new()),
            comments: Mutex::new(VecDeque::new()),
            new_comments: Mutex::new(VecDeque::new()),
            follows: Mutex::new(VecDeque::new()),
            calls: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            held: Mutex::new(false),
            gate: Semaphore::new(0),
        }
    }

    pub fn hold(&self) {
        *self.held.lock() = true;
    }

    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls.lock().get(endpoint).copied().unwrap_or(0)
    }

    /// Request descriptions in call order, e.g. `feed home page=1 limit=10`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Yield to other tasks until `endpoint` has been called `n` times.
    pub async fn wait_for_calls(&self, endpoint: &str, n: usize) {
        for _ in 0..1000 {
            if self.calls(endpoint) >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(self.calls(endpoint) >= n, "{} was never called {} times", endpoint, n);
    }

    async fn enter(&self, endpoint: &'static str, request: String) {
        *self.calls.lock().entry(endpoint).or_default() += 1;
        self.requests.lock().push(request);
        let held = *self.held.lock();
        if held {
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }
    }

    fn next<T>(queue: &Mutex<VecDeque<Result<T, ApiError>>>) -> Result<T, ApiError> {
        queue.lock().pop_front().unwrap_or_else(|| Err(server_error()))
    }
}

#[async_trait::async_trait]
impl CodegramApi for FakeApi {
    async fn current_user(&self) -> Result<User, ApiError> {
        self.enter("me", "me".into()).await;
        let user = self.user.lock().clone();
        user.ok_or(ApiError::Server { status: 401, message: "not signed in".into() })
    }

    async fn fetch_feed(
        &self,
        source: FeedSource,
        page: u32,
        limit: u32,
    ) -> Result<FeedPage, ApiError> {
        self.enter("feed", format!("feed {} page={} limit={}", source, page, limit)).await;
        Self::next(&self.feed)
    }

    async fn toggle(
        &self,
        kind: InteractionKind,
        target: &ContentRef,
    ) -> Result<ToggleState, ApiError> {
        self.enter("toggle", format!("{} {}:{}", kind, target.kind, target.id)).await;
        Self::next(&self.toggles)
    }

    async fn fetch_notifications(&self) -> Result<NotificationList, ApiError> {
        self.enter("notifications", "notifications".into()).await;
        Self::next(&self.notifications)
    }

    async fn mark_notifications_read(&self) -> Result<(), ApiError> {
        self.enter("mark_read", "notifications/read".into()).await;
        Self::next(&self.mark_read)
    }

    async fn fetch_comments(&self, target: &ContentRef) -> Result<Vec<Comment>, ApiError> {
        self.enter("comments", format!("comments {}:{}", target.kind, target.id)).await;
        Self::next(&self.comments)
    }

    async fn add_comment(&self, target: &ContentRef, content: &str) -> Result<Comment, ApiError> {
        self.enter("add_comment", format!("comment {}:{} {}", target.kind, target.id, content))
            .await;
        Self::next(&self.new_comments)
    }

    async fn toggle_follow(&self, user_id: &str) -> Result<FollowStatus, ApiError> {
        self.enter("follow", format!("follow {}", user_id)).await;
        Self::next(&self.follows)
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        username: format!("user-{}", id),
        name: None,
        avatar: None,
        role: Default::default(),
    }
}

pub fn snippet(id: &str, engagement: Engagement) -> ContentItem {
    ContentItem::Snippet(Snippet {
        base: ContentBase {
            id: id.to_string(),
            title: format!("snippet {}", id),
            author: user("author"),
            created_at: "2024-03-01T10:00:00Z".parse().unwrap(),
            updated_at: None,
            tags: Vec::new(),
            engagement,
        },
        description: None,
        content: "fn main() {}".into(),
        language: "rust".into(),
    })
}

pub fn item(id: &str) -> ContentItem {
    snippet(id, Engagement::default())
}

pub fn liked(id: &str, is_liked: bool, likes_count: u32) -> ContentItem {
    snippet(id, Engagement { is_liked, likes_count, ..Default::default() })
}

pub fn page(ids: &[&str], has_more: bool) -> FeedPage {
    FeedPage { data: ids.iter().map(|id| item(id)).collect(), has_more }
}

pub fn notification(id: &str, read: bool) -> Notification {
    Notification {
        id: id.to_string(),
        kind: NotificationKind::Like,
        sender: user("sender"),
        read,
        snippet: None,
        doc: None,
        comment: None,
        created_at: "2024-03-01T12:00:00Z".parse().unwrap(),
    }
}

pub fn comment(id: &str, content: &str) -> Comment {
    Comment {
        id: id.to_string(),
        content: content.to_string(),
        author: user("commenter"),
        created_at: "2024-03-01T12:00:00Z".parse().unwrap(),
        replies: Vec::new(),
    }
}

pub fn ids(items: &[ContentItem]) -> Vec<&str> {
    items.iter().map(ContentItem::id).collect()
}
