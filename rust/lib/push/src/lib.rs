//! CodeGram push channel.
//!
//! One persistent connection per authenticated session, over which the
//! server delivers events (new notifications, new feed content) without a
//! matching request. The channel never touches client state directly:
//! decoded [`PushEvent`](codegram_types::PushEvent)s are forwarded into an
//! mpsc queue, and whoever owns the receiving end routes them.
//!
//! - [`PushTransport`]: how a connection is opened (WebSocket in production)
//! - [`PushChannel`]: connection lifecycle keyed on the signed-in user
//!
//! Disconnects are logged and followed by a reconnect after a fixed delay;
//! they are never surfaced to the caller.

mod channel;
mod error;
mod transport;
mod websocket;

pub use channel::{ChannelStatus, PushChannel};
pub use error::PushError;
pub use transport::{PushStream, PushTransport};
pub use websocket::{PushConfig, WebSocketTransport};
