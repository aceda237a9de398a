use std::time::Duration;

use futures::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async_with_config};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::CoinsConfig;
use crate::errors::CoinsError;
use crate::push::codec::{Incoming, MAX_FRAME_BYTES, decode_message};
use crate::push::errors::PushError;
use crate::push::messages::PushEvent;

/// Buffered push events per subscription.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// How long a cancelled connection waits for the close handshake.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

type PushSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Source of push subscriptions.
///
/// `subscribe` starts delivering events for `token` until `cancel` fires or
/// the returned receiver is dropped. A closed receiver means the
/// subscription ended for good.
pub trait PushConnector: Send + Sync + 'static {
    fn subscribe(&self, token: String, cancel: CancellationToken) -> mpsc::Receiver<PushEvent>;
}

/// Push channel over a WebSocket.
///
/// The bearer token goes in the `Authorization` header of the upgrade
/// request. Reconnects after drops and failed handshakes with exponential
/// backoff.
#[derive(Debug, Clone)]
pub struct WsPushConnector {
    url: String,
    reconnect_delay: Duration,
    max_reconnect_delay: Duration,
}

impl WsPushConnector {
    pub fn new(
        url: impl Into<String>,
        reconnect_delay: Duration,
        max_reconnect_delay: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            reconnect_delay,
            max_reconnect_delay: max_reconnect_delay.max(reconnect_delay),
        }
    }

    pub fn from_config(config: &CoinsConfig) -> Self {
        Self::new(
            config.push_url(),
            config.reconnect_delay(),
            config.max_reconnect_delay(),
        )
    }

    async fn connect(&self, token: &str) -> Result<PushSocket, PushError> {
        let failed = |message: String| PushError::ConnectionFailed {
            url: self.url.clone(),
            message,
        };

        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| failed(e.to_string()))?;
        let bearer =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| failed(e.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        let mut config = WebSocketConfig::default();
        config.max_message_size = Some(MAX_FRAME_BYTES);

        let (socket, _response) = connect_async_with_config(request, Some(config), false)
            .await
            .map_err(|e| failed(e.to_string()))?;
        Ok(socket)
    }
}

impl PushConnector for WsPushConnector {
    fn subscribe(&self, token: String, cancel: CancellationToken) -> mpsc::Receiver<PushEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        tokio::spawn(run_subscription(self.clone(), token, cancel, tx));
        rx
    }
}

/// How a single connection ended.
enum SessionEnd {
    Cancelled,
    ReceiverGone,
    Dropped(String),
}

async fn run_subscription(
    connector: WsPushConnector,
    token: String,
    cancel: CancellationToken,
    tx: mpsc::Sender<PushEvent>,
) {
    let mut delay = connector.reconnect_delay;

    loop {
        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            result = connector.connect(&token) => result,
        };

        let event = match connected {
            Ok(socket) => {
                delay = connector.reconnect_delay;
                match run_session(socket, &cancel, &tx).await {
                    SessionEnd::Cancelled | SessionEnd::ReceiverGone => break,
                    SessionEnd::Dropped(reason) => {
                        warn!(
                            event = "core.push.disconnected",
                            url = connector.url,
                            reason = reason,
                        );
                        PushEvent::Disconnected { reason }
                    }
                }
            }
            Err(error) => {
                warn!(
                    event = "core.push.connect_failed",
                    error = %error,
                    error_code = error.error_code(),
                    retry_in_ms = delay.as_millis() as u64,
                );
                PushEvent::ConnectError {
                    message: error.to_string(),
                }
            }
        };

        if tx.send(event).await.is_err() {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
        delay = (delay * 2).min(connector.max_reconnect_delay);
    }

    debug!(event = "core.push.subscription_ended", url = connector.url);
}

async fn run_session(
    mut socket: PushSocket,
    cancel: &CancellationToken,
    tx: &mpsc::Sender<PushEvent>,
) -> SessionEnd {
    info!(event = "core.push.connected");
    if tx.send(PushEvent::Connected).await.is_err() {
        close(&mut socket).await;
        return SessionEnd::ReceiverGone;
    }

    loop {
        let message = tokio::select! {
            _ = cancel.cancelled() => {
                close(&mut socket).await;
                return SessionEnd::Cancelled;
            }
            message = socket.next() => message,
        };

        let incoming = match message {
            Some(Ok(message)) => decode_message(message),
            Some(Err(e)) => return SessionEnd::Dropped(PushError::from(e).to_string()),
            None => return SessionEnd::Dropped("server closed connection".to_string()),
        };

        let frame = match incoming {
            Ok(Incoming::Frame(frame)) => frame,
            Ok(Incoming::Control) => continue,
            Ok(Incoming::Close(reason)) => {
                return SessionEnd::Dropped(
                    reason.unwrap_or_else(|| "server closed connection".to_string()),
                );
            }
            Err(e) => {
                warn!(event = "core.push.frame_malformed", error = %e);
                continue;
            }
        };

        let name = frame.event.clone();
        let event = match frame.into_event() {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!(event = "core.push.frame_ignored", name = name);
                continue;
            }
            Err(e) => {
                warn!(event = "core.push.frame_malformed", name = name, error = %e);
                continue;
            }
        };

        if tx.send(event).await.is_err() {
            close(&mut socket).await;
            return SessionEnd::ReceiverGone;
        }
    }
}

/// Send a close frame and give the server a moment to answer.
async fn close(socket: &mut PushSocket) {
    match tokio::time::timeout(CLOSE_TIMEOUT, socket.close(None)).await {
        Ok(Ok(())) => debug!(event = "core.push.closed"),
        Ok(Err(e)) => debug!(event = "core.push.close_failed", error = %e),
        Err(_) => debug!(event = "core.push.close_timed_out"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_delay_never_below_initial() {
        let connector = WsPushConnector::new(
            "ws://localhost:1",
            Duration::from_millis(500),
            Duration::from_millis(100),
        );
        assert_eq!(connector.max_reconnect_delay, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_connect_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("ws://{}/mining", listener.local_addr().unwrap());
        drop(listener);

        let connector =
            WsPushConnector::new(url, Duration::from_millis(10), Duration::from_millis(20));
        let cancel = CancellationToken::new();
        let mut rx = connector.subscribe("token".to_string(), cancel.clone());

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, PushEvent::ConnectError { .. }));

        cancel.cancel();
        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok(), "subscription should end after cancel");
    }

    #[tokio::test]
    async fn test_invalid_url_is_connect_error() {
        let connector = WsPushConnector::new(
            "not a url",
            Duration::from_millis(10),
            Duration::from_millis(20),
        );
        let cancel = CancellationToken::new();
        let mut rx = connector.subscribe("token".to_string(), cancel.clone());

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let PushEvent::ConnectError { message } = event else {
            panic!("expected connect error, got {event:?}");
        };
        assert!(message.contains("not a url"), "{message}");

        cancel.cancel();
    }
}
