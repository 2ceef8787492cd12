//! Response envelopes of the REST API.

use serde::{Deserialize, Serialize};

use crate::comment::Comment;
use crate::content::ContentItem;
use crate::notification::Notification;

/// One page of `GET /feed` (or `GET /bugs`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub data: Vec<ContentItem>,
    pub has_more: bool,
}

/// `GET /notifications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub unread_count: u32,
}

/// `GET /comments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentList {
    pub comments: Vec<Comment>,
}

/// `POST /follows`: the post-toggle relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatus {
    pub is_following: bool,
}
