//! Server-pushed events.

use serde::{Deserialize, Serialize};

use crate::content::ContentItem;
use crate::notification::Notification;

/// An event delivered over the push channel.
///
/// Frames look like `{"event": "new_notification", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum PushEvent {
    NewNotification(Notification),
    NewContent(ContentItem),
}

/// Payload-free discriminant of [`PushEvent`], used to route events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushEventKind {
    NewNotification,
    NewContent,
}

impl PushEvent {
    pub fn kind(&self) -> PushEventKind {
        match self {
            PushEvent::NewNotification(_) => PushEventKind::NewNotification,
            PushEvent::NewContent(_) => PushEventKind::NewContent,
        }
    }
}
