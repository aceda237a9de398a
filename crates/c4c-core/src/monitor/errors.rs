use crate::errors::CoinsError;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Mining monitor has stopped")]
    Stopped,
}

impl CoinsError for MonitorError {
    fn error_code(&self) -> &'static str {
        match self {
            MonitorError::Stopped => "MONITOR_STOPPED",
        }
    }
}
