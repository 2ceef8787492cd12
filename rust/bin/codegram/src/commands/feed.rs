//! Feed listing.

use std::path::Path;

use anyhow::Result;

use codegram_client::FeedSource;
use codegram_state::FetchOutcome;

use crate::commands::{item_line, open_session};

/// Page through `source` for up to `pages` pages and print every item.
pub async fn list(
    source: FeedSource,
    pages: u32,
    json_output: bool,
    client_config_path: &Path,
) -> Result<()> {
    let session = open_session(client_config_path, source, false).await?;
    let feed = session.feed();

    for _ in 0..pages {
        match feed.fetch_next().await? {
            FetchOutcome::Appended { .. } => {}
            FetchOutcome::Skipped | FetchOutcome::Stale => break,
        }
        if !feed.snapshot().has_more {
            break;
        }
    }

    let state = feed.snapshot();
    if json_output {
        println!("{}", serde_json::to_string_pretty(&state.items)?);
    } else if state.items.is_empty() {
        println!("Nothing in the {} feed yet.", source);
    } else {
        for item in &state.items {
            println!("{}", item_line(item));
        }
        if state.has_more {
            println!("... more available (use --pages {})", pages + 1);
        }
    }

    session.end();
    Ok(())
}
