//! The authenticated viewer a dashboard is shown to.
//!
//! Passed explicitly into the monitor; a change of viewer (login, logout,
//! role change) tears down and re-establishes the mining subscriptions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    CollegeAdmin,
    PlatformAdmin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Student => "student",
            Role::CollegeAdmin => "college_admin",
            Role::PlatformAdmin => "platform_admin",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "student" => Ok(Role::Student),
            "college_admin" => Ok(Role::CollegeAdmin),
            "platform_admin" => Ok(Role::PlatformAdmin),
            _ => Err(ConfigError::InvalidRole {
                role: s.to_string(),
            }),
        }
    }
}

/// Bearer token plus role of the logged-in user.
#[derive(Clone, PartialEq, Eq)]
pub struct Viewer {
    pub token: String,
    pub role: Role,
}

impl Viewer {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }

    /// Only students mine, so only students get a mining subscription.
    pub fn is_eligible(&self) -> bool {
        self.role == Role::Student && !self.token.trim().is_empty()
    }
}

// Keeps the token out of logs.
impl fmt::Debug for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewer")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}
