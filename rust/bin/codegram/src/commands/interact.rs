//! Likes, bookmarks, comments and follows.

use std::path::Path;

use anyhow::Result;

use codegram_client::FeedSource;
use codegram_state::{CommentError, ToggleOutcome};
use codegram_types::{ContentKind, ContentRef, InteractionKind};

use crate::commands::{item_line, open_session};

/// Find `id` in the first `max_pages` feed pages and toggle `kind` on it.
pub async fn toggle(
    id: &str,
    kind: InteractionKind,
    max_pages: u32,
    client_config_path: &Path,
) -> Result<()> {
    let session = open_session(client_config_path, FeedSource::Home, false).await?;
    let feed = session.feed();

    for _ in 0..max_pages {
        if feed.get(id).is_some() || !feed.snapshot().has_more {
            break;
        }
        feed.fetch_next().await?;
    }
    if feed.get(id).is_none() {
        anyhow::bail!("\"{}\" is not in the first {} pages of your feed.", id, max_pages);
    }

    match session.interactions().toggle(id, kind).await? {
        ToggleOutcome::Confirmed(state) => {
            let verb = match (kind, state.active) {
                (InteractionKind::Like, true) => "Liked",
                (InteractionKind::Like, false) => "Unliked",
                (InteractionKind::Bookmark, true) => "Bookmarked",
                (InteractionKind::Bookmark, false) => "Removed bookmark from",
            };
            println!("{} {} ({} total).", verb, id, state.count);
        }
        ToggleOutcome::RolledBack { error, .. } => {
            anyhow::bail!("Could not {} {}: {}", kind, id, error);
        }
        ToggleOutcome::Ignored => println!("A {} on {} is already in progress.", kind, id),
    }
    if let Some(item) = feed.get(id) {
        println!("{}", item_line(&item));
    }

    session.end();
    Ok(())
}

/// Show the thread for an item, optionally posting to it first.
pub async fn comments(
    kind: &str,
    id: &str,
    add: Option<&str>,
    client_config_path: &Path,
) -> Result<()> {
    let kind: ContentKind = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let target = ContentRef::new(kind, id);

    let session = open_session(client_config_path, FeedSource::Home, false).await?;
    let comments = session.comments();

    comments.fetch(&target).await?;
    if let Some(text) = add {
        match comments.add(&target, text).await {
            Ok(c) => println!("Posted comment {}.", c.id),
            Err(CommentError::Empty) => anyhow::bail!("Comment cannot be empty."),
            Err(CommentError::Api(e)) => anyhow::bail!("Could not post comment: {}", e),
        }
    }

    let state = comments.snapshot();
    if state.comments.is_empty() {
        println!("No comments on {} {}.", kind, id);
    }
    for c in &state.comments {
        println!(
            "{:26} {:16} {}  {}",
            c.id,
            c.author.display_name(),
            c.created_at.format("%Y-%m-%d %H:%M"),
            c.content
        );
        for r in &c.replies {
            println!("  {:24} {:16} {}", r.id, r.author.display_name(), r.content);
        }
    }

    session.end();
    Ok(())
}

pub async fn follow(user_id: &str, client_config_path: &Path) -> Result<()> {
    let session = open_session(client_config_path, FeedSource::Home, false).await?;
    if session.user().id == user_id {
        anyhow::bail!("You cannot follow yourself.");
    }

    let toggle = session.follow(user_id, false);
    match toggle.toggle().await? {
        Some(true) => println!("Following {}.", user_id),
        Some(false) => println!("Unfollowed {}.", user_id),
        None => println!("A follow request for {} is already in progress.", user_id),
    }

    session.end();
    Ok(())
}
