//! Notification listing and live watch.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use codegram_client::FeedSource;
use codegram_state::EventBus;
use codegram_types::{Notification, PushEvent, PushEventKind};

use crate::commands::{item_line, open_session};

fn notification_line(n: &Notification) -> String {
    format!(
        "{} {:26} {}  {}",
        if n.read { " " } else { "*" },
        n.id,
        n.created_at.format("%Y-%m-%d %H:%M"),
        n.summary()
    )
}

/// Route every pushed event to `sink` as one display line.
fn watch_events<F>(bus: &EventBus, sink: F)
where
    F: Fn(String) + Send + Sync + Clone + 'static,
{
    let notify = sink.clone();
    bus.on(PushEventKind::NewNotification, move |ev| {
        if let PushEvent::NewNotification(n) = ev {
            notify(notification_line(n));
        }
    });
    bus.on(PushEventKind::NewContent, move |ev| {
        if let PushEvent::NewContent(item) = ev {
            sink(format!("new: {}", item_line(item)));
        }
    });
}

pub async fn run(
    read_all: bool,
    watch: bool,
    json_output: bool,
    client_config_path: &Path,
) -> Result<()> {
    let session = open_session(client_config_path, FeedSource::Home, watch).await?;
    if watch && !session.has_push() {
        anyhow::bail!(
            "No push endpoint set for this context. Run `codegram context set <name> --push <url>`."
        );
    }
    // Subscribe before fetching so nothing pushed during the fetch goes unprinted.
    if watch {
        watch_events(session.bus(), |line| println!("{}", line));
    }
    let store = session.notifications();

    store.fetch_all().await?;
    if read_all && store.mark_all_read().await? {
        println!("Marked all notifications read.");
    }

    let state = store.snapshot();
    if json_output {
        println!("{}", serde_json::to_string_pretty(&state.notifications)?);
    } else {
        println!("{} unread", state.unread_count);
        for n in &state.notifications {
            println!("{}", notification_line(n));
        }
    }

    if watch {
        info!("watching for notifications; press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
        println!("{} unread", session.notifications().unread_count());
    }

    session.end();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn pushed(id: &str) -> Notification {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "type": "FOLLOW",
            "sender": {"id": "u2", "username": "linus"},
            "createdAt": "2024-03-02T08:30:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn watched_events_become_lines() {
        let bus = EventBus::new();
        let lines = Arc::new(Mutex::new(Vec::new()));
        let out = lines.clone();
        watch_events(&bus, move |line| out.lock().unwrap().push(line));

        assert_eq!(bus.dispatch(&PushEvent::NewNotification(pushed("n1"))), 1);

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("* n1 "));
        assert!(lines[0].ends_with("@linus started following you"));
    }
}
