use serde::Serialize;

use crate::mining::types::{CollegeId, Dashboard, SessionSnapshot};

/// Displayed wallet figures for one college.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletView {
    /// Confirmed balance; zero when the wallet is missing.
    pub balance: f64,
    /// Tokens accrued by the running session, zero when none is running.
    pub in_flight: f64,
    pub total: f64,
}

/// `balance + current_tokens` while the session is live, else `balance`.
pub fn displayed_total(balance: f64, session: Option<&SessionSnapshot>) -> f64 {
    let balance = if balance.is_finite() { balance } else { 0.0 };
    balance + session.map_or(0.0, SessionSnapshot::in_flight_tokens)
}

pub fn wallet_view(dashboard: &Dashboard, college: &CollegeId) -> WalletView {
    let balance = dashboard.wallet_for(college).map_or(0.0, |w| w.balance);
    let session = dashboard.session_for(college);
    let in_flight = session.map_or(0.0, SessionSnapshot::in_flight_tokens);

    WalletView {
        balance,
        in_flight,
        total: displayed_total(balance, session),
    }
}
