use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::CoinsConfig;
use crate::config::defaults::DEFAULT_POLL_INTERVAL_SECS;
use crate::mining::overview::CollegeRow;
use crate::mining::types::{CollegeId, Dashboard};
use crate::sync::notices::Notice;

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    pub push_enabled: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            push_enabled: true,
        }
    }
}

impl From<&CoinsConfig> for MonitorConfig {
    fn from(config: &CoinsConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            push_enabled: config.push_enabled(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PushStatus {
    /// No subscription: push is turned off or nobody eligible is logged in.
    #[default]
    Disabled,
    Connecting,
    Connected,
    /// Dropped or failed to connect; running poll-only until it recovers.
    Disconnected,
}

impl fmt::Display for PushStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            PushStatus::Disabled => "disabled",
            PushStatus::Connecting => "connecting",
            PushStatus::Connected => "connected",
            PushStatus::Disconnected => "disconnected",
        };
        f.write_str(status)
    }
}

/// User-initiated requests to the monitor.
#[derive(Debug, Clone, PartialEq)]
pub enum MiningCommand {
    Start(CollegeId),
    Stop(CollegeId),
    Refresh,
    DismissNotice(u64),
}

/// Read-only snapshot of everything a dashboard view renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorView {
    pub viewer_eligible: bool,
    /// True until the first data of the current mount arrives.
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<Dashboard>,
    pub rows: Vec<CollegeRow>,
    pub push_status: PushStatus,
    pub notices: Vec<Notice>,
    /// Colleges with a start/stop request in flight.
    pub pending: Vec<CollegeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,
}
