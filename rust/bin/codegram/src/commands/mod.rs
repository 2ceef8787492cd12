pub mod context;
pub mod feed;
pub mod interact;
pub mod login;
pub mod notifications;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use codegram_client::{ClientOptions, CodegramApi, FeedSource, HttpClient};
use codegram_push::{PushConfig, PushTransport, WebSocketTransport};
use codegram_state::{Session, SessionConfig};
use codegram_types::ContentItem;

use crate::config::{ClientConfig, Context};

/// The current context, which must have a server URL.
pub fn current_context(client_config_path: &Path) -> Result<Context> {
    let config = ClientConfig::load(client_config_path)?;
    let ctx = config
        .current()
        .ok_or_else(|| anyhow::anyhow!("No current context. Run `codegram use context <name>`."))?
        .clone();
    if ctx.server.is_empty() {
        anyhow::bail!(
            "No server URL set for context \"{}\". Run `codegram context set {} --server <url>`.",
            ctx.name,
            ctx.name
        );
    }
    Ok(ctx)
}

pub fn build_client(ctx: &Context) -> Result<HttpClient> {
    let session_cookie = (!ctx.session.is_empty()).then(|| ctx.session.clone());
    let client = HttpClient::new(ClientOptions { base_url: ctx.server.clone(), session_cookie })?;
    Ok(client)
}

/// Open a session for the current context. With `with_push`, real-time
/// events are delivered if the context has a push endpoint.
pub async fn open_session(
    client_config_path: &Path,
    source: FeedSource,
    with_push: bool,
) -> Result<Session> {
    let ctx = current_context(client_config_path)?;
    let api: Arc<dyn CodegramApi> = Arc::new(build_client(&ctx)?);

    let push: Option<Arc<dyn PushTransport>> = if with_push && !ctx.push.is_empty() {
        let mut cfg = PushConfig::new(ctx.push.clone());
        if !ctx.session.is_empty() {
            cfg = cfg.with_session_cookie(ctx.session.clone());
        }
        Some(Arc::new(WebSocketTransport::new(cfg)))
    } else {
        None
    };

    let session = Session::start(api, SessionConfig { feed_source: source, push, ..Default::default() })
        .await
        .map_err(|e| {
            if e.is_unauthorized() {
                anyhow::anyhow!("Not logged in to \"{}\". Run `codegram login --cookie <cookie>`.", ctx.name)
            } else {
                anyhow::anyhow!("failed to start session: {}", e)
            }
        })?;
    Ok(session)
}

/// One listing line for a feed item.
pub fn item_line(item: &ContentItem) -> String {
    let e = item.engagement();
    format!(
        "{:8} {:26} {:40} {:16} likes {:<4} comments {:<4}{}{}",
        item.kind(),
        item.id(),
        truncate(item.title(), 40),
        item.author().display_name(),
        e.likes_count,
        e.comments_count,
        if e.is_liked { " liked" } else { "" },
        if e.is_bookmarked { " saved" } else { "" },
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
