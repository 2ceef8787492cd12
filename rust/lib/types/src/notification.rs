//! Inbox notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
    Reply,
}

/// Title-only reference to the snippet or doc a notification is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSummary {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSummary {
    pub id: String,
    pub content: String,
}

/// A notification as returned by `GET /notifications` and as delivered by
/// the push channel (both carry the same shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub sender: User,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<ContentSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<ContentSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentSummary>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// One-line description, e.g. `@ada liked "Binary search"`.
    pub fn summary(&self) -> String {
        let who = format!("@{}", self.sender.username);
        let subject = self
            .snippet
            .as_ref()
            .or(self.doc.as_ref())
            .map(|c| format!(" \"{}\"", c.title))
            .unwrap_or_default();
        match self.kind {
            NotificationKind::Like => format!("{} liked{}", who, subject),
            NotificationKind::Comment => format!("{} commented on{}", who, subject),
            NotificationKind::Reply => format!("{} replied to your comment", who),
            NotificationKind::Follow => format!("{} started following you", who),
        }
    }
}
