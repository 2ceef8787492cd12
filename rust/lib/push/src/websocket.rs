//! WebSocket push transport.

use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, COOKIE};
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use codegram_types::PushEvent;

use crate::error::PushError;
use crate::transport::{PushStream, PushTransport};

/// Push endpoint settings.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// WebSocket endpoint, e.g. `wss://codegram.dev/push`.
    pub url: String,
    /// Same cookie the REST client sends; the server authenticates the
    /// upgrade request with it.
    pub session_cookie: Option<String>,
}

impl PushConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), session_cookie: None }
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }
}

/// [`PushTransport`] over tokio-tungstenite.
///
/// Text and binary frames carry one JSON [`PushEvent`] each. Frames that do
/// not decode (unknown event names included) are skipped. Control frames
/// are handled by tungstenite.
pub struct WebSocketTransport {
    config: PushConfig,
}

impl WebSocketTransport {
    pub fn new(config: PushConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }
}

/// Decode one frame. `None` means "nothing to forward".
fn decode_frame(msg: Message) -> Option<Result<PushEvent, PushError>> {
    let parsed = match msg {
        Message::Text(text) => serde_json::from_str::<PushEvent>(&text),
        Message::Binary(data) => serde_json::from_slice::<PushEvent>(&data),
        _ => return None,
    };
    match parsed {
        Ok(event) => Some(Ok(event)),
        Err(e) => {
            debug!(error = %e, "skipping undecodable push frame");
            None
        }
    }
}

#[async_trait::async_trait]
impl PushTransport for WebSocketTransport {
    async fn connect(&self) -> Result<PushStream, PushError> {
        let mut request = self
            .config
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| PushError::Connect(e.to_string()))?;

        if let Some(cookie) = self.config.session_cookie.as_deref().filter(|c| !c.is_empty()) {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| PushError::Connect(format!("session cookie: {}", e)))?;
            request.headers_mut().insert(COOKIE, value);
        }

        let (ws, response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| PushError::Connect(e.to_string()))?;
        debug!(url = %self.config.url, status = %response.status(), "push socket open");

        let events = ws.filter_map(|msg| async move {
            match msg {
                Ok(msg) => decode_frame(msg),
                Err(e) => Some(Err(PushError::Transport(e.to_string()))),
            }
        });
        Ok(events.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::Router;

    const NOTIFICATION_FRAME: &str = r#"{"event": "new_notification", "data": {
        "id": "n1", "type": "LIKE", "read": false,
        "sender": {"id": "u2", "username": "linus"},
        "createdAt": "2024-03-01T12:00:00Z"
    }}"#;

    async fn push_socket(mut socket: WebSocket) {
        let frames = [
            r#"{"event": "typing", "data": {}}"#.to_string(),
            "not json".to_string(),
            NOTIFICATION_FRAME.to_string(),
        ];
        for frame in frames {
            if socket.send(WsMessage::Text(frame)).await.is_err() {
                return;
            }
        }
        let _ = socket.send(WsMessage::Close(None)).await;
    }

    async fn upgrade(headers: HeaderMap, ws: WebSocketUpgrade) -> Response {
        let has_session = headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .map(|c| c.contains("sid=abc"))
            .unwrap_or(false);
        if !has_session {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        ws.on_upgrade(push_socket)
    }

    async fn serve() -> String {
        let app = Router::new().route("/push", get(upgrade));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("ws://{}/push", addr)
    }

    #[test]
    fn control_and_garbage_frames_are_skipped() {
        assert!(decode_frame(Message::Ping(vec![1])).is_none());
        assert!(decode_frame(Message::Text("{}".into())).is_none());
        let ev = decode_frame(Message::Binary(NOTIFICATION_FRAME.as_bytes().to_vec()));
        assert!(matches!(ev, Some(Ok(PushEvent::NewNotification(_)))));
    }

    #[tokio::test]
    async fn forwards_only_decodable_events() {
        let url = serve().await;
        let transport = WebSocketTransport::new(PushConfig::new(url).with_session_cookie("sid=abc"));

        let mut stream = transport.connect().await.unwrap();
        let mut events = Vec::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(ev) => events.push(ev),
                Err(_) => break,
            }
        }

        assert_eq!(events.len(), 1);
        let PushEvent::NewNotification(n) = &events[0] else {
            panic!("expected notification");
        };
        assert_eq!(n.id, "n1");
    }

    #[tokio::test]
    async fn rejected_upgrade_is_a_connect_error() {
        let url = serve().await;
        let transport = WebSocketTransport::new(PushConfig::new(url));
        let err = transport.connect().await.err().unwrap();
        assert!(matches!(err, PushError::Connect(_)));
    }

    #[test]
    fn session_cookie_is_optional() {
        let cfg = PushConfig::new("ws://localhost/push").with_session_cookie("sid=abc");
        assert_eq!(cfg.url, "ws://localhost/push");
        assert_eq!(cfg.session_cookie.as_deref(), Some("sid=abc"));
        assert!(PushConfig::new("ws://localhost/push").session_cookie.is_none());
    }
}
