use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of one mining session in hours.
pub const SESSION_HOURS: f64 = 24.0;

/// Identifier of a college, normalized to a string.
///
/// The server sends numeric ids, string ids or populated objects; all of them
/// end up here after validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollegeId(String);

impl CollegeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollegeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollegeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Point-in-time description of one college's mining session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub college: CollegeId,
    pub is_active: bool,
    /// Hours left of the fixed-length session. NaN when the server omitted it.
    pub remaining_hours: f64,
    /// Tokens per hour, fixed for the lifetime of the session.
    pub earning_rate: f64,
    /// Tokens accrued so far in this session (server-computed).
    pub current_tokens: f64,
}

impl SessionSnapshot {
    /// A session is terminated when inactive or out of time; terminated
    /// sessions show no accrual.
    pub fn is_terminated(&self) -> bool {
        !self.is_active || !(self.remaining_hours > 0.0)
    }

    /// Tokens in flight that count towards the displayed wallet total.
    pub fn in_flight_tokens(&self) -> f64 {
        if self.is_terminated() || !self.current_tokens.is_finite() || self.current_tokens < 0.0 {
            0.0
        } else {
            self.current_tokens
        }
    }
}

/// Confirmed, already-settled balance of one college token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub college: CollegeId,
    pub balance: f64,
}

/// A college the student can mine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningCollege {
    pub id: CollegeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl MiningCollege {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// The three fields owned by the push channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningStatusUpdate {
    pub mining_colleges: Vec<MiningCollege>,
    pub active_sessions: Vec<SessionSnapshot>,
    pub wallets: Vec<WalletBalance>,
}

/// Full dashboard payload as returned by the poll endpoint.
///
/// `student` and `summary` are displayed verbatim and never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<serde_json::Value>,
    pub mining_colleges: Vec<MiningCollege>,
    pub active_sessions: Vec<SessionSnapshot>,
    pub wallets: Vec<WalletBalance>,
}

impl Dashboard {
    /// Replace the push-owned fields, leaving profile and summary untouched.
    pub fn apply_status(&mut self, update: MiningStatusUpdate) {
        self.mining_colleges = update.mining_colleges;
        self.active_sessions = update.active_sessions;
        self.wallets = update.wallets;
    }

    pub fn session_for(&self, college: &CollegeId) -> Option<&SessionSnapshot> {
        self.active_sessions.iter().find(|s| &s.college == college)
    }

    pub fn wallet_for(&self, college: &CollegeId) -> Option<&WalletBalance> {
        self.wallets.iter().find(|w| &w.college == college)
    }
}
