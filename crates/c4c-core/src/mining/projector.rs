//! Yield projection: turns a session snapshot into display-ready values.
//!
//! Pure and I/O-free, so callers may run it on every render without
//! throttling. Malformed input never errors; it projects as offline.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::mining::types::{SESSION_HOURS, SessionSnapshot};

/// Remaining time of a session, or `Offline` when no session is running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemainingTime {
    Hours(f64),
    Offline,
}

impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemainingTime::Hours(hours) => write!(f, "{hours:.1}h"),
            RemainingTime::Offline => f.write_str("offline"),
        }
    }
}

impl Serialize for RemainingTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    /// Share of the session elapsed, in `[0, 100]`.
    pub progress_percent: f64,
    pub remaining: RemainingTime,
}

impl Projection {
    pub const OFFLINE: Projection = Projection {
        progress_percent: 0.0,
        remaining: RemainingTime::Offline,
    };

    pub fn is_offline(&self) -> bool {
        self.remaining == RemainingTime::Offline
    }
}

/// Project a snapshot into a progress percentage and remaining-time label.
///
/// `progress = (24 - remaining) / 24 * 100`, clamped to `[0, 100]`.
/// Inactive sessions and negative or non-finite `remaining_hours` project as
/// [`Projection::OFFLINE`]. Values above the session length are clamped to it.
pub fn project(snapshot: &SessionSnapshot) -> Projection {
    let remaining = snapshot.remaining_hours;
    if !snapshot.is_active || !remaining.is_finite() || remaining < 0.0 {
        return Projection::OFFLINE;
    }

    let remaining = remaining.min(SESSION_HOURS);
    let progress = ((SESSION_HOURS - remaining) / SESSION_HOURS) * 100.0;

    Projection {
        progress_percent: progress.clamp(0.0, 100.0),
        remaining: RemainingTime::Hours(remaining),
    }
}

/// Project an optional snapshot; a missing session is offline.
pub fn project_or_offline(snapshot: Option<&SessionSnapshot>) -> Projection {
    snapshot.map(project).unwrap_or(Projection::OFFLINE)
}

/// Expected yield of a complete session at the snapshot's rate.
///
/// Informational only: the live figure is always the server's `current_tokens`.
pub fn session_yield_estimate(snapshot: &SessionSnapshot) -> f64 {
    let rate = snapshot.earning_rate;
    if rate.is_finite() && rate > 0.0 {
        rate * SESSION_HOURS
    } else {
        0.0
    }
}
