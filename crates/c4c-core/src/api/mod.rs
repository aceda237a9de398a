//! REST access to the mining endpoints.

pub mod client;
pub mod errors;
pub mod traits;

pub use client::HttpMiningApi;
pub use errors::ApiError;
pub use traits::{ActionOutcome, MiningAction, MiningApi};
