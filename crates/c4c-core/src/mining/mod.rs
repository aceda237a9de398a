//! Mining session data, boundary validation and yield projection.

pub mod errors;
pub mod overview;
pub mod projector;
pub mod types;
pub mod validation;
pub mod wallet;

pub use errors::PayloadError;
pub use overview::{CollegeRow, college_rows};
pub use projector::{
    Projection, RemainingTime, project, project_or_offline, session_yield_estimate,
};
pub use types::{
    CollegeId, Dashboard, MiningCollege, MiningStatusUpdate, SESSION_HOURS, SessionSnapshot,
    WalletBalance,
};
pub use wallet::{WalletView, displayed_total, wallet_view};
