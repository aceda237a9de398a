//! Configuration type definitions.
//!
//! These types are deserialized from TOML config files. Every field is
//! optional so that user and project files can be merged field by field;
//! the resolved values (with defaults applied) are exposed through accessor
//! methods on [`CoinsConfig`].
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://coinsforcollege.example/api"
//! request_timeout_secs = 10
//!
//! [push]
//! url = "wss://coinsforcollege.example/mining"
//! reconnect_delay_ms = 1000
//! max_reconnect_delay_ms = 30000
//!
//! [sync]
//! poll_interval_secs = 30
//!
//! [auth]
//! role = "student"
//! ```

use serde::{Deserialize, Serialize};

/// Main configuration loaded from TOML config files.
///
/// Loaded from:
/// 1. User config: `~/.c4c/config.toml`
/// 2. Project config: `./.c4c/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CoinsConfig {
    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Push channel settings
    #[serde(default)]
    pub push: PushConfig,

    /// Dashboard polling settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Credentials and role of the viewer
    #[serde(default)]
    pub auth: AuthConfig,
}

/// REST API configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ApiConfig {
    /// Base URL all endpoints are joined onto (e.g. `http://localhost:1337/api`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds.
    /// Default: 10 seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

/// Push channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PushConfig {
    /// WebSocket URL of the push endpoint (`ws://` or `wss://`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Set to `false` to run poll-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Initial delay before reconnecting after a drop.
    /// Default: 1000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect_delay_ms: Option<u64>,

    /// Upper bound for the exponential reconnect backoff.
    /// Default: 30000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reconnect_delay_ms: Option<u64>,
}

/// Dashboard polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SyncConfig {
    /// Interval in seconds between full dashboard fetches.
    /// Default: 30 seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,
}

/// Viewer credentials.
///
/// The token is only ever read from here; the client never writes it back.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// One of: student, college_admin, platform_admin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
