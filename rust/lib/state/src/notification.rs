//! Notification list and unread badge.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use codegram_client::{ApiError, CodegramApi};
use codegram_types::Notification;

/// Snapshot of the notification store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationState {
    /// Newest first.
    pub notifications: Vec<Notification>,
    /// Unsigned, so it can never go negative.
    pub unread_count: u32,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Notification list shared by the panel, the badge and the push channel.
///
/// `receive_pushed` may run at any time relative to `fetch_all` and
/// `mark_all_read`. The rules that keep a pushed event from being lost:
///
/// - A push that lands while `fetch_all` is in flight is re-applied on top of
///   the server list unless the server list already contains it.
/// - A push that lands while `mark_all_read` is in flight stays unread.
/// - A failed `mark_all_read` restores the counter unless a fetched list
///   replaced it first.
pub struct NotificationStore {
    api: Arc<dyn CodegramApi>,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    state: NotificationState,
    fetch_gen: u64,
    /// Bumped each time a server list replaces the state.
    applied_gen: u64,
    /// Pushes received while a fetch is in flight.
    arrived_during_fetch: Vec<Notification>,
}

impl NotificationStore {
    pub fn new(api: Arc<dyn CodegramApi>) -> Self {
        Self { api, inner: RwLock::new(Inner::default()) }
    }

    /// Replace the list and counter with the server's.
    ///
    /// Returns `Ok(false)` when a later `fetch_all` superseded this one and
    /// its response was dropped.
    pub async fn fetch_all(&self) -> Result<bool, ApiError> {
        let generation = {
            let mut inner = self.inner.write();
            inner.fetch_gen += 1;
            inner.state.is_loading = true;
            inner.state.error = None;
            inner.arrived_during_fetch.clear();
            inner.fetch_gen
        };

        let result = self.api.fetch_notifications().await;

        let mut inner = self.inner.write();
        if inner.fetch_gen != generation {
            debug!(generation, "dropping superseded notification list");
            return Ok(false);
        }
        inner.state.is_loading = false;
        let arrived = std::mem::take(&mut inner.arrived_during_fetch);

        match result {
            Ok(list) => {
                inner.applied_gen += 1;
                let state = &mut inner.state;
                state.notifications = list.notifications;
                state.unread_count = list.unread_count;
                for n in arrived {
                    if state.notifications.iter().any(|held| held.id == n.id) {
                        continue;
                    }
                    debug!(id = %n.id, "re-applying notification pushed during fetch");
                    state.notifications.insert(0, n);
                    state.unread_count = state.unread_count.saturating_add(1);
                }
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "notification fetch failed");
                inner.state.error = Some(format!("Failed to fetch notifications: {}", e));
                Err(e)
            }
        }
    }

    /// Apply a server-pushed notification. Returns `false` if a notification
    /// with the same id is already held.
    pub fn receive_pushed(&self, mut notification: Notification) -> bool {
        let mut inner = self.inner.write();
        if inner.state.notifications.iter().any(|n| n.id == notification.id) {
            debug!(id = %notification.id, "ignoring duplicate pushed notification");
            return false;
        }
        notification.read = false;
        if inner.state.is_loading {
            inner.arrived_during_fetch.push(notification.clone());
        }
        let state = &mut inner.state;
        state.notifications.insert(0, notification);
        state.unread_count = state.unread_count.saturating_add(1);
        true
    }

    /// Clear the badge and flag every notification read, then tell the
    /// server.
    ///
    /// Returns `Ok(false)` without a request when nothing is unread. On
    /// failure only the counter is restored: the cleared amount is added
    /// back onto the current value, which by then holds only pushes that
    /// arrived during the request. Per-item `read` flags stay set. If a
    /// fetched list landed in the meantime its counter is authoritative and
    /// nothing is added.
    pub async fn mark_all_read(&self) -> Result<bool, ApiError> {
        let (cleared, applied_gen) = {
            let mut inner = self.inner.write();
            let cleared = inner.state.unread_count;
            if cleared == 0 {
                return Ok(false);
            }
            inner.state.unread_count = 0;
            for n in inner.state.notifications.iter_mut() {
                n.read = true;
            }
            (cleared, inner.applied_gen)
        };

        match self.api.mark_notifications_read().await {
            Ok(()) => Ok(true),
            Err(e) => {
                let mut inner = self.inner.write();
                if inner.applied_gen == applied_gen {
                    warn!(error = %e, cleared, "mark-all-read failed; restoring unread count");
                    inner.state.unread_count = inner.state.unread_count.saturating_add(cleared);
                } else {
                    warn!(error = %e, "mark-all-read failed; keeping counter from newer list");
                }
                Err(e)
            }
        }
    }

    pub fn snapshot(&self) -> NotificationState {
        self.inner.read().state.clone()
    }

    pub fn unread_count(&self) -> u32 {
        self.inner.read().state.unread_count
    }
}
