//! Per-login container for every store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use codegram_client::{ApiError, CodegramApi, FeedSource};
use codegram_push::{ChannelStatus, PushChannel, PushTransport};
use codegram_types::{PushEvent, PushEventKind, User};

use crate::bus::EventBus;
use crate::comment::CommentStore;
use crate::feed::FeedStore;
use crate::follow::FollowToggle;
use crate::interaction::InteractionController;
use crate::notification::NotificationStore;

pub struct SessionConfig {
    pub feed_source: FeedSource,
    /// `None` runs without real-time updates.
    pub push: Option<Arc<dyn PushTransport>>,
    pub reconnect_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            feed_source: FeedSource::Home,
            push: None,
            reconnect_delay: Duration::from_secs(1),
        }
    }
}

/// Everything that lives for exactly one authenticated session.
///
/// `start` builds the stores, routes push events into them and opens the
/// push channel for the signed-in user. `end` (logout) tears all of it down.
/// Stores are handed out as `Arc`s; nothing here is global.
pub struct Session {
    user: User,
    api: Arc<dyn CodegramApi>,
    feed: Arc<FeedStore>,
    notifications: Arc<NotificationStore>,
    comments: Arc<CommentStore>,
    interactions: Arc<InteractionController>,
    bus: Arc<EventBus>,
    push: Option<PushChannel>,
    events: mpsc::UnboundedSender<PushEvent>,
    pump: JoinHandle<usize>,
}

impl Session {
    /// Resolve the signed-in user and bring up the stores.
    ///
    /// Fails if the session cookie is not accepted by `/auth/me`. Must be
    /// called from within a tokio runtime.
    pub async fn start(api: Arc<dyn CodegramApi>, config: SessionConfig) -> Result<Self, ApiError> {
        let user = api.current_user().await?;
        info!(user = %user.id, username = %user.username, "session started");

        let feed = Arc::new(FeedStore::new(Arc::clone(&api), config.feed_source));
        let notifications = Arc::new(NotificationStore::new(Arc::clone(&api)));
        let comments = Arc::new(CommentStore::with_feed(Arc::clone(&api), Arc::clone(&feed)));
        let interactions = Arc::new(InteractionController::new(Arc::clone(&api), Arc::clone(&feed)));

        let bus = Arc::new(EventBus::new());
        {
            let notifications = Arc::clone(&notifications);
            bus.on(PushEventKind::NewNotification, move |ev| {
                if let PushEvent::NewNotification(n) = ev {
                    notifications.receive_pushed(n.clone());
                }
            });
        }
        {
            let feed = Arc::clone(&feed);
            bus.on(PushEventKind::NewContent, move |ev| {
                if let PushEvent::NewContent(item) = ev {
                    feed.prepend_item(item.clone());
                }
            });
        }

        let (events, rx) = mpsc::unbounded_channel();
        let pump = tokio::spawn(Arc::clone(&bus).pump(rx));

        let push = config.push.map(|transport| {
            let channel = PushChannel::new(transport, events.clone(), config.reconnect_delay);
            channel.connect(&user.id);
            channel
        });

        Ok(Self { user, api, feed, notifications, comments, interactions, bus, push, events, pump })
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn feed(&self) -> &Arc<FeedStore> {
        &self.feed
    }

    pub fn notifications(&self) -> &Arc<NotificationStore> {
        &self.notifications
    }

    pub fn comments(&self) -> &Arc<CommentStore> {
        &self.comments
    }

    pub fn interactions(&self) -> &Arc<InteractionController> {
        &self.interactions
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Follow button state for `user_id`.
    pub fn follow(&self, user_id: &str, is_following: bool) -> FollowToggle {
        FollowToggle::new(Arc::clone(&self.api), user_id, is_following)
    }

    /// Sender side of the push queue. Events sent here are routed exactly
    /// like events from the push transport.
    pub fn push_sender(&self) -> mpsc::UnboundedSender<PushEvent> {
        self.events.clone()
    }

    /// Ask for the push channel. Any number of callers share one connection.
    pub fn ensure_push(&self) -> bool {
        match &self.push {
            Some(channel) => channel.connect(&self.user.id),
            None => false,
        }
    }

    pub fn has_push(&self) -> bool {
        self.push.is_some()
    }

    pub fn push_status(&self) -> ChannelStatus {
        self.push.as_ref().map(PushChannel::status).unwrap_or(ChannelStatus::Idle)
    }

    /// Logout: stop real-time delivery and drop session-owned state.
    pub fn end(self) {
        if let Some(channel) = &self.push {
            channel.disconnect();
        }
        self.pump.abort();
        self.feed.reset();
        self.comments.clear();
        info!(user = %self.user.id, "session ended");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.pump.abort();
    }
}
