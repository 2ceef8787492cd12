//! Comments and threaded replies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author: User,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl Comment {
    /// Number of comments in this thread, the comment itself included.
    pub fn thread_len(&self) -> usize {
        1 + self.replies.iter().map(Comment::thread_len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_replies_are_counted() {
        let json = r#"{
            "id": "c1", "content": "nice", "createdAt": "2024-03-01T12:00:00Z",
            "author": {"id": "u1", "username": "ada"},
            "replies": [{
                "id": "c2", "content": "thanks", "createdAt": "2024-03-01T12:05:00Z",
                "author": {"id": "u2", "username": "linus"},
                "replies": [{
                    "id": "c3", "content": "np", "createdAt": "2024-03-01T12:06:00Z",
                    "author": {"id": "u1", "username": "ada"}
                }]
            }]
        }"#;
        let c: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(c.thread_len(), 3);
        assert!(c.replies[0].replies[0].replies.is_empty());
    }
}
