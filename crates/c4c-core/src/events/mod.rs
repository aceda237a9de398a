//! Process-level lifecycle events shared by the CLI commands.

use tracing::{error, info, warn};

use crate::errors::CoinsError;

pub fn log_app_startup(command: &str) {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION"),
        command = command,
    );
}

pub fn log_app_shutdown() {
    info!(event = "core.app.shutdown_started");
}

/// Record a command-ending failure. User errors (bad token, rejected
/// request) are warnings; everything else is an error.
pub fn log_app_error(error: &dyn CoinsError) {
    if error.is_user_error() {
        warn!(
            event = "core.app.user_error",
            error = %error,
            error_code = error.error_code(),
        );
    } else {
        error!(
            event = "core.app.error_occurred",
            error = %error,
            error_code = error.error_code(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::monitor::MonitorError;

    #[test]
    fn test_app_events_do_not_panic() {
        log_app_startup("status");
        log_app_shutdown();
        log_app_error(&MonitorError::Stopped);
        log_app_error(&ApiError::Unauthorized);
    }
}
