//! # Configuration System
//!
//! Hierarchical TOML configuration for the Coins For College client.
//!
//! ## Configuration Hierarchy
//!
//! 1. **Hardcoded defaults** - see [`defaults`]
//! 2. **User config** - `~/.c4c/config.toml`
//! 3. **Project config** - `./.c4c/config.toml`
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use c4c_core::config::CoinsConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CoinsConfig::load_hierarchy()?;
//!     println!("polling {} every {:?}", config.base_url(), config.poll_interval());
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{ApiConfig, AuthConfig, CoinsConfig, PushConfig, SyncConfig};
pub use validation::validate_config;

impl CoinsConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}
