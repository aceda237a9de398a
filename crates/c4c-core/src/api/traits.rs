use std::fmt;
use std::future::Future;

use serde::Serialize;

use crate::api::errors::ApiError;
use crate::mining::types::{CollegeId, Dashboard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MiningAction {
    Start,
    Stop,
}

impl fmt::Display for MiningAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiningAction::Start => f.write_str("start"),
            MiningAction::Stop => f.write_str("stop"),
        }
    }
}

/// Successful start/stop envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// REST operations the mining dashboard depends on.
///
/// The monitor only talks to this trait, so tests substitute in-memory
/// implementations for the HTTP client.
pub trait MiningApi: Send + Sync + 'static {
    fn fetch_dashboard(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Dashboard, ApiError>> + Send;

    fn start_mining(
        &self,
        token: &str,
        college: &CollegeId,
    ) -> impl Future<Output = Result<ActionOutcome, ApiError>> + Send;

    fn stop_mining(
        &self,
        token: &str,
        college: &CollegeId,
    ) -> impl Future<Output = Result<ActionOutcome, ApiError>> + Send;

    fn perform(
        &self,
        action: MiningAction,
        token: &str,
        college: &CollegeId,
    ) -> impl Future<Output = Result<ActionOutcome, ApiError>> + Send {
        async move {
            match action {
                MiningAction::Start => self.start_mining(token, college).await,
                MiningAction::Stop => self.stop_mining(token, college).await,
            }
        }
    }
}
