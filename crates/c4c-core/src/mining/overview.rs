//! Per-college rows joining colleges, sessions and wallets for display.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::mining::projector::{Projection, project_or_offline, session_yield_estimate};
use crate::mining::types::{CollegeId, Dashboard};
use crate::mining::wallet::{WalletView, wallet_view};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeRow {
    pub college: CollegeId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub projection: Projection,
    pub earning_rate: f64,
    pub session_yield_estimate: f64,
    pub wallet: WalletView,
}

/// Build one row per college known to the dashboard.
///
/// Colleges listed in `miningColleges` come first in server order; colleges
/// only referenced by a session or wallet follow, sorted by id.
pub fn college_rows(dashboard: &Dashboard) -> Vec<CollegeRow> {
    let listed: Vec<(CollegeId, String, Option<String>)> = dashboard
        .mining_colleges
        .iter()
        .map(|c| (c.id.clone(), c.display_name().to_string(), c.symbol.clone()))
        .collect();

    let extra: BTreeSet<&CollegeId> = dashboard
        .active_sessions
        .iter()
        .map(|s| &s.college)
        .chain(dashboard.wallets.iter().map(|w| &w.college))
        .filter(|id| !listed.iter().any(|(listed_id, _, _)| listed_id == *id))
        .collect();

    let extra = extra
        .into_iter()
        .map(|id| (id.clone(), id.to_string(), None));

    listed
        .iter()
        .cloned()
        .chain(extra)
        .map(|(college, name, symbol)| {
            let session = dashboard.session_for(&college);
            CollegeRow {
                projection: project_or_offline(session),
                earning_rate: session.map_or(0.0, |s| s.earning_rate),
                session_yield_estimate: session.map_or(0.0, session_yield_estimate),
                wallet: wallet_view(dashboard, &college),
                college,
                name,
                symbol,
            }
        })
        .collect()
}
