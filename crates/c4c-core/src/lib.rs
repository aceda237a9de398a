//! c4c-core: Core library for the Coins For College mining dashboard
//!
//! Fetches a student's mining dashboard, merges live status from the push
//! channel, and projects session progress and wallet totals. Used by the
//! `c4c` CLI.
//!
//! # Main Entry Points
//!
//! - [`mining`] - Session data, validation and yield projection
//! - [`monitor`] - Poll/push reconciliation for a logged-in viewer
//! - [`api`] - REST client for the mining endpoints
//! - [`push`] - Live mining status channel
//! - [`config`] - Configuration management

pub mod api;
pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod mining;
pub mod monitor;
pub mod push;
pub mod sync;
pub mod viewer;

// Re-export commonly used types at crate root for convenience
pub use api::{ApiError, HttpMiningApi, MiningAction, MiningApi};
pub use config::CoinsConfig;
pub use errors::{CoinsError, ConfigError};
pub use mining::{
    CollegeId, CollegeRow, Dashboard, Projection, RemainingTime, SessionSnapshot, project,
};
pub use monitor::{MiningMonitor, MonitorConfig, MonitorHandle, MonitorView, PushStatus};
pub use push::{PushConnector, PushEvent, WsPushConnector};
pub use viewer::{Role, Viewer};

// Re-export logging initialization
pub use logging::init_logging;
