//! CodeGram data model.
//!
//! Shapes shared by the REST client, the push channel and the client-side
//! stores. Everything here mirrors the server's JSON contract (camelCase
//! fields, RFC 3339 timestamps) and carries no behavior beyond small
//! accessors and the engagement patch/toggle helpers.
//!
//! - [`ContentItem`]: feed entries, tagged by `type` (snippet | doc | bug)
//! - [`Notification`]: inbox entries, also delivered over the push channel
//! - [`User`]: denormalized profile snapshot embedded as author / sender
//! - [`PushEvent`]: server-pushed events

pub mod comment;
pub mod content;
pub mod notification;
pub mod push;
pub mod user;
pub mod wire;

pub use comment::Comment;
pub use content::{
    Bug, BugSeverity, BugStatus, ContentBase, ContentItem, ContentKind, ContentRef, Doc,
    Engagement, InteractionKind, ItemPatch, Snippet, ToggleState,
};
pub use notification::{CommentSummary, ContentSummary, Notification, NotificationKind};
pub use push::{PushEvent, PushEventKind};
pub use user::{Role, User};
pub use wire::{CommentList, FeedPage, FollowStatus, NotificationList};
