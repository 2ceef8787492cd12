use std::fmt;

use codegram_types::{
    Comment, ContentRef, FeedPage, FollowStatus, InteractionKind, NotificationList, ToggleState,
    User,
};

use crate::error::ApiError;

/// Which paginated listing a feed store pages through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FeedSource {
    /// Personal home feed, `GET /feed`.
    #[default]
    Home,
    /// Bug reports only, `GET /bugs`.
    Bugs,
}

impl FeedSource {
    pub fn path(&self) -> &'static str {
        match self {
            FeedSource::Home => "/feed",
            FeedSource::Bugs => "/bugs",
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Home => f.pad("home"),
            FeedSource::Bugs => f.pad("bugs"),
        }
    }
}

/// The REST API as seen by the client-side stores.
///
/// Implemented by [`HttpClient`](crate::HttpClient); tests substitute
/// scripted fakes.
#[async_trait::async_trait]
pub trait CodegramApi: Send + Sync + 'static {
    /// `GET /auth/me`: the user the session cookie belongs to.
    async fn current_user(&self) -> Result<User, ApiError>;

    /// One page of a feed. Pages start at 1.
    async fn fetch_feed(&self, source: FeedSource, page: u32, limit: u32)
        -> Result<FeedPage, ApiError>;

    /// Toggle a like or bookmark. Returns the post-toggle authoritative
    /// `(flag, count)` pair.
    async fn toggle(&self, kind: InteractionKind, target: &ContentRef)
        -> Result<ToggleState, ApiError>;

    async fn fetch_notifications(&self) -> Result<NotificationList, ApiError>;

    /// `POST /notifications/read`: acknowledge every notification.
    async fn mark_notifications_read(&self) -> Result<(), ApiError>;

    async fn fetch_comments(&self, target: &ContentRef) -> Result<Vec<Comment>, ApiError>;

    async fn add_comment(&self, target: &ContentRef, content: &str) -> Result<Comment, ApiError>;

    /// Follow or unfollow a user. Returns the resulting relationship.
    async fn toggle_follow(&self, user_id: &str) -> Result<FollowStatus, ApiError>;
}
