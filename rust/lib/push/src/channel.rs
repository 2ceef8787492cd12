use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use codegram_types::PushEvent;

use crate::transport::PushTransport;

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    /// No session, nothing running.
    Idle,
    Connecting,
    Connected,
    /// Connection lost; a reconnect is scheduled.
    Disconnected,
}

/// Shared push connection for one authenticated session.
///
/// - `connect(user_id)` starts the connection task. Repeated calls for the
///   same user are no-ops, so any number of UI components may ask for the
///   channel without opening duplicates. A different user replaces the
///   running connection.
/// - `disconnect()` tears the connection down (logout).
///
/// Every decoded event is forwarded, in arrival order, into the mpsc sender
/// given at construction. The task stops for good once the receiving side
/// of that queue is dropped.
pub struct PushChannel {
    transport: Arc<dyn PushTransport>,
    sink: mpsc::UnboundedSender<PushEvent>,
    reconnect_delay: Duration,
    active: Mutex<Option<ActiveConnection>>,
    status: Arc<watch::Sender<ChannelStatus>>,
}

struct ActiveConnection {
    user_id: String,
    task: JoinHandle<()>,
}

impl PushChannel {
    pub fn new(
        transport: Arc<dyn PushTransport>,
        sink: mpsc::UnboundedSender<PushEvent>,
        reconnect_delay: Duration,
    ) -> Self {
        let (status, _) = watch::channel(ChannelStatus::Idle);
        Self {
            transport,
            sink,
            reconnect_delay,
            active: Mutex::new(None),
            status: Arc::new(status),
        }
    }

    /// Ensure a connection exists for `user_id`.
    ///
    /// Returns `true` if a new connection task was started. Must be called
    /// from within a tokio runtime.
    pub fn connect(&self, user_id: &str) -> bool {
        let mut active = self.active.lock();
        if let Some(conn) = active.as_ref() {
            if conn.user_id == user_id && !conn.task.is_finished() {
                return false;
            }
        }
        if let Some(old) = active.take() {
            debug!(user = %old.user_id, "replacing push connection");
            old.task.abort();
        }

        info!(user = %user_id, "starting push channel");
        let task = tokio::spawn(run_connection(
            Arc::clone(&self.transport),
            self.sink.clone(),
            self.reconnect_delay,
            Arc::clone(&self.status),
        ));
        *active = Some(ActiveConnection { user_id: user_id.to_string(), task });
        true
    }

    /// Tear down the connection, if any.
    pub fn disconnect(&self) {
        if let Some(conn) = self.active.lock().take() {
            info!(user = %conn.user_id, "stopping push channel");
            conn.task.abort();
        }
        self.status.send_replace(ChannelStatus::Idle);
    }

    /// User the running connection belongs to.
    pub fn connected_user(&self) -> Option<String> {
        self.active
            .lock()
            .as_ref()
            .filter(|c| !c.task.is_finished())
            .map(|c| c.user_id.clone())
    }

    pub fn status(&self) -> ChannelStatus {
        *self.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<ChannelStatus> {
        self.status.subscribe()
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        if let Some(conn) = self.active.get_mut().take() {
            conn.task.abort();
        }
    }
}

async fn run_connection(
    transport: Arc<dyn PushTransport>,
    sink: mpsc::UnboundedSender<PushEvent>,
    reconnect_delay: Duration,
    status: Arc<watch::Sender<ChannelStatus>>,
) {
    loop {
        status.send_replace(ChannelStatus::Connecting);
        match transport.connect().await {
            Ok(mut events) => {
                status.send_replace(ChannelStatus::Connected);
                info!("push channel connected");
                while let Some(item) = events.next().await {
                    match item {
                        Ok(event) => {
                            if sink.send(event).is_err() {
                                debug!("push queue closed; stopping");
                                status.send_replace(ChannelStatus::Idle);
                                return;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "push stream failed");
                            break;
                        }
                    }
                }
                warn!("push channel disconnected");
            }
            Err(e) => warn!(error = %e, "push connect failed"),
        }

        status.send_replace(ChannelStatus::Disconnected);
        if sink.is_closed() {
            status.send_replace(ChannelStatus::Idle);
            return;
        }
        tokio::time::sleep(reconnect_delay).await;
    }
}
