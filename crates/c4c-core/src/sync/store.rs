use chrono::{DateTime, Utc};
use tracing::debug;

use crate::mining::overview::{CollegeRow, college_rows};
use crate::mining::types::{CollegeId, Dashboard, MiningStatusUpdate, SessionSnapshot};
use crate::mining::wallet::displayed_total;

/// Issue-order marker for a full dashboard fetch.
///
/// Taken when the request is sent, handed back with the response so the
/// store can tell whether push data arrived while the request was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PollTicket {
    seq: u64,
}

impl PollTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Nothing received yet; the view shows a loading indicator.
    Uninitialized,
    /// At least one source has populated the dashboard.
    Populated,
}

/// What applying a poll response did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The whole dashboard was replaced.
    Replaced,
    /// Push data newer than the request was kept; only profile and summary
    /// were taken from the response.
    ProfileOnly,
    /// A newer poll response was already applied; nothing changed.
    Stale,
}

/// Single authoritative dashboard view fed by two sources.
///
/// A poll response replaces the whole dashboard and a push update replaces
/// the push-owned fields (`miningColleges`, `activeSessions`, `wallets`).
/// Every poll ticket and every applied push draws from one monotonic
/// sequence, so a poll issued before the latest push never reverts the
/// push-owned fields.
#[derive(Debug, Default)]
pub struct DashboardStore {
    dashboard: Option<Dashboard>,
    seq: u64,
    push_seq: u64,
    applied_poll_seq: u64,
    last_refresh: Option<DateTime<Utc>>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SyncPhase {
        if self.dashboard.is_some() {
            SyncPhase::Populated
        } else {
            SyncPhase::Uninitialized
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == SyncPhase::Uninitialized
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }

    /// Timestamp of the last state change from either source.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    pub fn session_for(&self, college: &CollegeId) -> Option<&SessionSnapshot> {
        self.dashboard.as_ref()?.session_for(college)
    }

    /// Confirmed balance of `college`; zero when no wallet is known.
    pub fn wallet_balance(&self, college: &CollegeId) -> f64 {
        self.dashboard
            .as_ref()
            .and_then(|d| d.wallet_for(college))
            .map_or(0.0, |w| w.balance)
    }

    pub fn displayed_total(&self, college: &CollegeId) -> f64 {
        displayed_total(self.wallet_balance(college), self.session_for(college))
    }

    /// Display rows for every known college; empty while uninitialized.
    pub fn rows(&self) -> Vec<CollegeRow> {
        self.dashboard.as_ref().map(college_rows).unwrap_or_default()
    }

    /// Record that a poll request is being issued.
    pub fn begin_poll(&mut self) -> PollTicket {
        self.seq += 1;
        PollTicket { seq: self.seq }
    }

    pub fn apply_poll(&mut self, ticket: PollTicket, response: Dashboard) -> PollOutcome {
        if ticket.seq < self.applied_poll_seq {
            debug!(
                event = "core.sync.poll_discarded",
                ticket = ticket.seq,
                applied = self.applied_poll_seq,
            );
            return PollOutcome::Stale;
        }
        self.applied_poll_seq = ticket.seq;
        self.last_refresh = Some(Utc::now());

        let push_is_newer = self.push_seq > ticket.seq;
        match self.dashboard.as_mut() {
            Some(current) if push_is_newer => {
                current.student = response.student;
                current.summary = response.summary;
                debug!(
                    event = "core.sync.poll_applied",
                    ticket = ticket.seq,
                    push_seq = self.push_seq,
                    scope = "profile_only",
                );
                PollOutcome::ProfileOnly
            }
            _ => {
                self.dashboard = Some(response);
                debug!(
                    event = "core.sync.poll_applied",
                    ticket = ticket.seq,
                    scope = "full",
                );
                PollOutcome::Replaced
            }
        }
    }

    pub fn apply_push(&mut self, update: MiningStatusUpdate) {
        self.seq += 1;
        self.push_seq = self.seq;
        self.last_refresh = Some(Utc::now());

        self.dashboard
            .get_or_insert_with(Dashboard::default)
            .apply_status(update);

        debug!(event = "core.sync.push_applied", seq = self.push_seq);
    }

    /// Forget everything, returning to `Uninitialized` (a fresh mount).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining::types::WalletBalance;
    use serde_json::json;

    fn session(current_tokens: f64, remaining_hours: f64) -> SessionSnapshot {
        SessionSnapshot {
            college: CollegeId::new("7"),
            is_active: true,
            remaining_hours,
            earning_rate: 0.35,
            current_tokens,
        }
    }

    fn poll_response(current_tokens: f64, student_name: &str) -> Dashboard {
        Dashboard {
            student: Some(json!({ "name": student_name })),
            summary: Some(json!({ "colleges": 1 })),
            active_sessions: vec![session(current_tokens, 20.0)],
            wallets: vec![WalletBalance {
                college: CollegeId::new("7"),
                balance: 10.0,
            }],
            ..Default::default()
        }
    }

    fn push_update(current_tokens: f64) -> MiningStatusUpdate {
        MiningStatusUpdate {
            active_sessions: vec![session(current_tokens, 19.0)],
            ..Default::default()
        }
    }

    fn tokens(store: &DashboardStore) -> f64 {
        store.dashboard().unwrap().active_sessions[0].current_tokens
    }

    #[test]
    fn test_starts_uninitialized_and_loading() {
        let store = DashboardStore::new();
        assert_eq!(store.phase(), SyncPhase::Uninitialized);
        assert!(store.is_loading());
        assert!(store.dashboard().is_none());
        assert!(store.last_refresh().is_none());
    }

    #[test]
    fn test_poll_populates_whole_dashboard() {
        let mut store = DashboardStore::new();
        let ticket = store.begin_poll();
        assert_eq!(
            store.apply_poll(ticket, poll_response(1.0, "Ada")),
            PollOutcome::Replaced
        );
        assert_eq!(store.phase(), SyncPhase::Populated);
        assert_eq!(store.dashboard(), Some(&poll_response(1.0, "Ada")));
        assert!(store.last_refresh().is_some());
    }

    #[test]
    fn test_push_replaces_only_push_owned_fields() {
        let mut store = DashboardStore::new();
        let ticket = store.begin_poll();
        store.apply_poll(ticket, poll_response(1.0, "Ada"));

        store.apply_push(push_update(1.4));

        let dashboard = store.dashboard().unwrap();
        assert_eq!(dashboard.student, Some(json!({ "name": "Ada" })));
        assert_eq!(dashboard.summary, Some(json!({ "colleges": 1 })));
        assert_eq!(tokens(&store), 1.4);
        assert!(dashboard.wallets.is_empty(), "push replaces wallets too");
    }

    #[test]
    fn test_push_first_populates_without_profile() {
        let mut store = DashboardStore::new();
        store.apply_push(push_update(0.7));
        assert_eq!(store.phase(), SyncPhase::Populated);
        assert!(store.dashboard().unwrap().student.is_none());
    }

    #[test]
    fn test_poll_issued_before_push_does_not_revert_push_fields() {
        let mut store = DashboardStore::new();
        let first = store.begin_poll();
        store.apply_poll(first, poll_response(1.0, "Ada"));

        // Poll issued, push lands while it is in flight, then the poll resolves.
        let ticket = store.begin_poll();
        store.apply_push(push_update(1.6));
        let outcome = store.apply_poll(ticket, poll_response(1.2, "Ada Lovelace"));

        assert_eq!(outcome, PollOutcome::ProfileOnly);
        assert_eq!(tokens(&store), 1.6, "currentTokens must not regress");
        assert_eq!(
            store.dashboard().unwrap().student,
            Some(json!({ "name": "Ada Lovelace" }))
        );
    }

    #[test]
    fn test_poll_issued_after_push_replaces_everything() {
        let mut store = DashboardStore::new();
        store.apply_push(push_update(1.6));

        let ticket = store.begin_poll();
        let outcome = store.apply_poll(ticket, poll_response(1.9, "Ada"));

        assert_eq!(outcome, PollOutcome::Replaced);
        assert_eq!(tokens(&store), 1.9);
    }

    #[test]
    fn test_older_poll_resolving_late_is_discarded() {
        let mut store = DashboardStore::new();
        let older = store.begin_poll();
        let newer = store.begin_poll();

        store.apply_poll(newer, poll_response(2.0, "new"));
        assert_eq!(
            store.apply_poll(older, poll_response(1.0, "old")),
            PollOutcome::Stale
        );
        assert_eq!(tokens(&store), 2.0);
        assert_eq!(
            store.dashboard().unwrap().student,
            Some(json!({ "name": "new" }))
        );
    }

    #[test]
    fn test_tokens_never_regress_under_interleaving() {
        let mut store = DashboardStore::new();
        let mut server_tokens = 0.0;
        let mut displayed = Vec::new();

        for round in 0..10 {
            let ticket = store.begin_poll();
            // The poll response is a snapshot taken when the request was served.
            let snapshot_tokens = server_tokens;
            server_tokens += 0.1;
            store.apply_push(push_update(server_tokens));
            displayed.push(tokens(&store));
            if round % 2 == 0 {
                store.apply_poll(ticket, poll_response(snapshot_tokens, "Ada"));
                displayed.push(tokens(&store));
            }
        }

        assert!(displayed.windows(2).all(|w| w[1] >= w[0]), "{displayed:?}");
    }

    #[test]
    fn test_derived_queries() {
        let mut store = DashboardStore::new();
        let college = CollegeId::new("7");
        assert!(store.rows().is_empty());
        assert_eq!(store.wallet_balance(&college), 0.0);

        let ticket = store.begin_poll();
        store.apply_poll(ticket, poll_response(2.5, "Ada"));

        assert_eq!(store.session_for(&college).unwrap().current_tokens, 2.5);
        assert_eq!(store.wallet_balance(&college), 10.0);
        assert_eq!(store.displayed_total(&college), 12.5);
        assert_eq!(store.displayed_total(&CollegeId::new("missing")), 0.0);
        assert_eq!(store.rows().len(), 1);
    }

    #[test]
    fn test_reset_returns_to_uninitialized() {
        let mut store = DashboardStore::new();
        store.apply_push(push_update(0.5));
        store.reset();
        assert!(store.is_loading());
        assert!(store.last_refresh().is_none());
    }
}
