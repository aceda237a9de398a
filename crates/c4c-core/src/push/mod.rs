//! WebSocket push channel carrying live mining status.

pub mod codec;
pub mod connection;
pub mod errors;
pub mod messages;

pub use connection::{PushConnector, WsPushConnector};
pub use errors::PushError;
pub use messages::{PushEvent, ServerFrame};
