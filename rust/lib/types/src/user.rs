//! User snapshot.

use serde::{Deserialize, Serialize};

/// Denormalized copy of a user's public profile.
///
/// Embedded wherever a user is referenced (item author, notification sender,
/// commenter). It is a snapshot, not a live reference: staleness is resolved
/// by re-fetching the embedding resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// Name to show in listings: the display name, falling back to `@username`.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("@{}", self.username),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}
