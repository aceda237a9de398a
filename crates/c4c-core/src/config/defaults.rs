//! Default values and resolved accessors for configuration types.

use std::time::Duration;

use crate::config::types::CoinsConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:1337/api";
pub const DEFAULT_PUSH_URL: &str = "ws://localhost:1337/mining";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_RECONNECT_DELAY_MS: u64 = 30_000;
pub const DEFAULT_ROLE: &str = "student";

impl CoinsConfig {
    pub fn base_url(&self) -> &str {
        self.api.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.api
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn push_url(&self) -> &str {
        self.push.url.as_deref().unwrap_or(DEFAULT_PUSH_URL)
    }

    pub fn push_enabled(&self) -> bool {
        self.push.enabled.unwrap_or(true)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(
            self.push
                .reconnect_delay_ms
                .unwrap_or(DEFAULT_RECONNECT_DELAY_MS),
        )
    }

    pub fn max_reconnect_delay(&self) -> Duration {
        Duration::from_millis(
            self.push
                .max_reconnect_delay_ms
                .unwrap_or(DEFAULT_MAX_RECONNECT_DELAY_MS),
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.sync
                .poll_interval_secs
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        )
    }

    pub fn role(&self) -> &str {
        self.auth.role.as_deref().unwrap_or(DEFAULT_ROLE)
    }

    /// Token from `C4C_TOKEN`, falling back to the config file.
    pub fn token(&self) -> Option<String> {
        std::env::var("C4C_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.auth.token.clone())
    }
}
