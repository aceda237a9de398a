//! Reconciliation of polled and pushed dashboard data.

pub mod notices;
pub mod store;

pub use notices::{Notice, NoticeLevel, Notices};
pub use store::{DashboardStore, PollOutcome, PollTicket, SyncPhase};
