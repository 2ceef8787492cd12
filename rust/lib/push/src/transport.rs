use futures_util::stream::BoxStream;

use codegram_types::PushEvent;

use crate::error::PushError;

/// Events of one open connection. The stream ending means the connection
/// is gone.
pub type PushStream = BoxStream<'static, Result<PushEvent, PushError>>;

/// Opens push connections.
///
/// A transport is stateless between calls: every `connect` opens a fresh
/// connection. Lifecycle (one connection per session, reconnects) lives in
/// [`PushChannel`](crate::PushChannel).
#[async_trait::async_trait]
pub trait PushTransport: Send + Sync + 'static {
    async fn connect(&self) -> Result<PushStream, PushError>;
}
