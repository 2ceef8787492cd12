use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::debug;

use codegram_types::{PushEvent, PushEventKind};

/// Handler invoked for each dispatched event of the kind it was registered
/// for.
pub type EventHandler = Arc<dyn Fn(&PushEvent) + Send + Sync>;

/// Handle returned by `EventBus::on()`, used to unregister with `off()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Routes push events to the stores that consume them.
///
/// The push transport only knows how to put events on a queue; `pump`
/// drains that queue and hands each event to the handlers registered with
/// `on(kind, handler)`. Handlers run synchronously, in registration order.
///
/// # Examples
///
/// ```ignore
/// let bus = Arc::new(EventBus::new());
/// let store = notifications.clone();
/// bus.on(PushEventKind::NewNotification, move |ev| {
///     if let PushEvent::NewNotification(n) = ev {
///         store.receive_pushed(n.clone());
///     }
/// });
/// tokio::spawn(bus.clone().pump(rx));
/// ```
pub struct EventBus {
    handlers: RwLock<HashMap<PushEventKind, Vec<(SubscriptionId, EventHandler)>>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn on<F>(&self, kind: PushEventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&PushEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Unregister a handler. Returns `false` if it was not registered.
    pub fn off(&self, kind: PushEventKind, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let Some(list) = handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(sid, _)| *sid != id);
        before != list.len()
    }

    /// Call every handler registered for the event's kind. Returns how many
    /// ran; zero is not an error.
    pub fn dispatch(&self, event: &PushEvent) -> usize {
        // Snapshot so a handler may call on()/off() without deadlocking.
        let handlers: Vec<EventHandler> = self
            .handlers
            .read()
            .get(&event.kind())
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Drain `rx` into `dispatch` until every sender is dropped. Returns the
    /// number of events drained.
    pub async fn pump(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<PushEvent>) -> usize {
        let mut drained = 0;
        while let Some(event) = rx.recv().await {
            drained += 1;
            let ran = self.dispatch(&event);
            if ran == 0 {
                debug!(kind = ?event.kind(), "push event had no handler");
            }
        }
        debug!(drained, "push queue closed");
        drained
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
