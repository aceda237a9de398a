//! Long-running dashboard sync for one viewer.
//!
//! [`MiningMonitor::spawn`] polls the dashboard on a fixed interval, applies
//! live mining status from the push channel, runs start/stop requests and
//! publishes a [`MonitorView`] after every change. Interact with it through
//! the returned [`MonitorHandle`].

pub mod errors;
pub mod handle;
pub mod runner;
pub mod types;

pub use errors::MonitorError;
pub use handle::MonitorHandle;
pub use runner::MiningMonitor;
pub use types::{MiningCommand, MonitorConfig, MonitorView, PushStatus};
