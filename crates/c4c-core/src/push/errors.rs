use tokio_tungstenite::tungstenite;

use crate::errors::CoinsError;

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Could not connect to push endpoint '{url}': {message}")]
    ConnectionFailed { url: String, message: String },

    #[error("Push frame exceeds {limit} bytes")]
    FrameTooLarge { limit: usize },

    #[error("Push protocol error: {message}")]
    Protocol { message: String },

    #[error("Push socket error: {message}")]
    Socket { message: String },
}

impl From<tungstenite::Error> for PushError {
    fn from(error: tungstenite::Error) -> Self {
        match error {
            tungstenite::Error::Capacity(e) => PushError::Protocol {
                message: e.to_string(),
            },
            other => PushError::Socket {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for PushError {
    fn from(error: serde_json::Error) -> Self {
        PushError::Protocol {
            message: error.to_string(),
        }
    }
}

impl CoinsError for PushError {
    fn error_code(&self) -> &'static str {
        match self {
            PushError::ConnectionFailed { .. } => "PUSH_CONNECTION_FAILED",
            PushError::FrameTooLarge { .. } => "PUSH_FRAME_TOO_LARGE",
            PushError::Protocol { .. } => "PUSH_PROTOCOL_ERROR",
            PushError::Socket { .. } => "PUSH_SOCKET_ERROR",
        }
    }
}
