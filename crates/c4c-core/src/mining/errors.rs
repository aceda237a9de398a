use crate::errors::CoinsError;

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Malformed {context} payload: expected a JSON object")]
    NotAnObject { context: &'static str },

    #[error("Invalid JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl CoinsError for PayloadError {
    fn error_code(&self) -> &'static str {
        match self {
            PayloadError::NotAnObject { .. } => "PAYLOAD_NOT_AN_OBJECT",
            PayloadError::Json { .. } => "PAYLOAD_INVALID_JSON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_an_object_display() {
        let err = PayloadError::NotAnObject {
            context: "dashboard",
        };
        assert_eq!(
            err.to_string(),
            "Malformed dashboard payload: expected a JSON object"
        );
        assert_eq!(err.error_code(), "PAYLOAD_NOT_AN_OBJECT");
        assert!(!err.is_user_error());
    }
}
