use crate::errors::CoinsError;
use crate::mining::errors::PayloadError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid API base URL '{url}'")]
    InvalidUrl { url: String },

    #[error("Not authorized: log in again or check the token")]
    Unauthorized,

    #[error("Server returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request rejected: {message}")]
    ActionRejected { message: String },

    #[error("Request failed: {message}")]
    Transport { message: String },

    #[error("Malformed response: {source}")]
    Payload {
        #[from]
        source: PayloadError,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        ApiError::Transport {
            message: error.to_string(),
        }
    }
}

impl CoinsError for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidUrl { .. } => "API_INVALID_URL",
            ApiError::Unauthorized => "API_UNAUTHORIZED",
            ApiError::Http { .. } => "API_HTTP_ERROR",
            ApiError::ActionRejected { .. } => "API_ACTION_REJECTED",
            ApiError::Transport { .. } => "API_TRANSPORT_ERROR",
            ApiError::Payload { .. } => "API_MALFORMED_RESPONSE",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidUrl { .. } | ApiError::Unauthorized | ApiError::ActionRejected { .. }
        )
    }
}
