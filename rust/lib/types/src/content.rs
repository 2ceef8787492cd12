//! Feed content: snippets, docs and bug reports.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::user::User;

// ── Kinds ───────────────────────────────────────────────────────────

/// Discriminant of a [`ContentItem`]. Immutable for the item's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Snippet,
    Doc,
    Bug,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Snippet => "snippet",
            ContentKind::Doc => "doc",
            ContentKind::Bug => "bug",
        }
    }

    /// Key used to address an item of this kind in request bodies and
    /// query strings (`snippetId`, `docId`, `bugId`).
    pub fn id_key(&self) -> &'static str {
        match self {
            ContentKind::Snippet => "snippetId",
            ContentKind::Doc => "docId",
            ContentKind::Bug => "bugId",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snippet" => Ok(ContentKind::Snippet),
            "doc" => Ok(ContentKind::Doc),
            "bug" => Ok(ContentKind::Bug),
            other => Err(format!("unknown content kind '{}'", other)),
        }
    }
}

/// Reference to a content item on the wire: `{"<kind>Id": "<id>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentRef {
    pub kind: ContentKind,
    pub id: String,
}

impl ContentRef {
    pub fn new(kind: ContentKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }
}

impl Serialize for ContentRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.kind.id_key(), &self.id)?;
        map.end()
    }
}

// ── Engagement ──────────────────────────────────────────────────────

/// The two toggleable interactions on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Like,
    Bookmark,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionKind::Like => f.pad("like"),
            InteractionKind::Bookmark => f.pad("bookmark"),
        }
    }
}

/// The (flag, counter) pair for one interaction kind, e.g.
/// `(isLiked, likesCount)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleState {
    pub active: bool,
    pub count: u32,
}

impl ToggleState {
    pub fn new(active: bool, count: u32) -> Self {
        Self { active, count }
    }

    /// The optimistic successor: flag flipped, counter moved by one.
    /// The counter never goes below zero.
    pub fn flipped(&self) -> Self {
        if self.active {
            Self { active: false, count: self.count.saturating_sub(1) }
        } else {
            Self { active: true, count: self.count.saturating_add(1) }
        }
    }
}

/// Mutable engagement fields of a content item.
///
/// Changed only through the interaction controller (likes, bookmarks) and
/// the comment store (comment count), never by the view layer directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Engagement {
    pub is_liked: bool,
    pub is_bookmarked: bool,
    pub likes_count: u32,
    pub comments_count: u32,
    pub bookmarks_count: u32,
}

impl Engagement {
    pub fn toggle_state(&self, kind: InteractionKind) -> ToggleState {
        match kind {
            InteractionKind::Like => ToggleState::new(self.is_liked, self.likes_count),
            InteractionKind::Bookmark => {
                ToggleState::new(self.is_bookmarked, self.bookmarks_count)
            }
        }
    }

    /// Shallow-merge a patch: only `Some` fields are written.
    pub fn apply(&mut self, patch: &ItemPatch) {
        if let Some(v) = patch.is_liked {
            self.is_liked = v;
        }
        if let Some(v) = patch.is_bookmarked {
            self.is_bookmarked = v;
        }
        if let Some(v) = patch.likes_count {
            self.likes_count = v;
        }
        if let Some(v) = patch.comments_count {
            self.comments_count = v;
        }
        if let Some(v) = patch.bookmarks_count {
            self.bookmarks_count = v;
        }
    }
}

/// Partial update of an item's engagement fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub is_liked: Option<bool>,
    pub is_bookmarked: Option<bool>,
    pub likes_count: Option<u32>,
    pub comments_count: Option<u32>,
    pub bookmarks_count: Option<u32>,
}

impl ItemPatch {
    /// Patch that writes both fields of one interaction kind.
    pub fn from_toggle(kind: InteractionKind, state: ToggleState) -> Self {
        match kind {
            InteractionKind::Like => Self {
                is_liked: Some(state.active),
                likes_count: Some(state.count),
                ..Default::default()
            },
            InteractionKind::Bookmark => Self {
                is_bookmarked: Some(state.active),
                bookmarks_count: Some(state.count),
                ..Default::default()
            },
        }
    }

    pub fn comments_count(count: u32) -> Self {
        Self { comments_count: Some(count), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ── Items ───────────────────────────────────────────────────────────

/// Fields every content kind carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBase {
    pub id: String,
    pub title: String,
    pub author: User,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub engagement: Engagement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(flatten)]
    pub base: ContentBase,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doc {
    #[serde(flatten)]
    pub base: ContentBase,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BugSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BugStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

/// Bug report. Becomes unreachable server-side once `expires_at` passes;
/// the client never re-derives that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bug {
    #[serde(flatten)]
    pub base: ContentBase,
    pub description: String,
    pub content: String,
    pub severity: BugSeverity,
    pub status: BugStatus,
    #[serde(default)]
    pub media: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

/// A feed entry. `type` on the wire selects the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Snippet(Snippet),
    Doc(Doc),
    Bug(Bug),
}

impl ContentItem {
    pub fn base(&self) -> &ContentBase {
        match self {
            ContentItem::Snippet(s) => &s.base,
            ContentItem::Doc(d) => &d.base,
            ContentItem::Bug(b) => &b.base,
        }
    }

    fn base_mut(&mut self) -> &mut ContentBase {
        match self {
            ContentItem::Snippet(s) => &mut s.base,
            ContentItem::Doc(d) => &mut d.base,
            ContentItem::Bug(b) => &mut b.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentItem::Snippet(_) => ContentKind::Snippet,
            ContentItem::Doc(_) => ContentKind::Doc,
            ContentItem::Bug(_) => ContentKind::Bug,
        }
    }

    pub fn title(&self) -> &str {
        &self.base().title
    }

    pub fn author(&self) -> &User {
        &self.base().author
    }

    pub fn engagement(&self) -> &Engagement {
        &self.base().engagement
    }

    pub fn content_ref(&self) -> ContentRef {
        ContentRef::new(self.kind(), self.id())
    }

    /// Shallow-merge engagement fields. Identity, kind and timestamps are
    /// not patchable.
    pub fn apply(&mut self, patch: &ItemPatch) {
        self.base_mut().engagement.apply(patch);
    }
}
