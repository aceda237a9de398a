//! Decoding of WebSocket messages on the push channel.

use tokio_tungstenite::tungstenite::Message;

use crate::push::errors::PushError;
use crate::push::messages::ServerFrame;

/// Upper bound for a single message.
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// What one incoming message means for the connection.
#[derive(Debug)]
pub enum Incoming {
    Frame(ServerFrame),
    /// The server closed the socket, with its reason if it gave one.
    Close(Option<String>),
    /// Ping, pong and raw frames; the socket answers pings itself.
    Control,
}

/// Decode one message. Text and binary messages carry a JSON `ServerFrame`.
pub fn decode_message(message: Message) -> Result<Incoming, PushError> {
    match message {
        Message::Text(text) => decode_frame(text.as_bytes()),
        Message::Binary(bytes) => decode_frame(&bytes),
        Message::Close(frame) => Ok(Incoming::Close(
            frame
                .map(|frame| frame.reason.to_string())
                .filter(|reason| !reason.is_empty()),
        )),
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Ok(Incoming::Control),
    }
}

fn decode_frame(bytes: &[u8]) -> Result<Incoming, PushError> {
    if bytes.len() > MAX_FRAME_BYTES {
        return Err(PushError::FrameTooLarge {
            limit: MAX_FRAME_BYTES,
        });
    }
    Ok(Incoming::Frame(serde_json::from_slice(bytes)?))
}
