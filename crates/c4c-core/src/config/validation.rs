//! Configuration validation.

use crate::config::types::CoinsConfig;
use crate::errors::ConfigError;
use crate::viewer::Role;

/// Validate a merged configuration.
///
/// Checks the API and push URL schemes, non-zero intervals, reconnect bounds and the role.
pub fn validate_config(config: &CoinsConfig) -> Result<(), ConfigError> {
    let base_url = config.base_url();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidConfiguration {
            message: format!("api.base_url must start with http:// or https://, got '{base_url}'"),
        });
    }

    if config.sync.poll_interval_secs == Some(0) {
        return Err(ConfigError::InvalidConfiguration {
            message: "sync.poll_interval_secs must be greater than 0".to_string(),
        });
    }

    if config.api.request_timeout_secs == Some(0) {
        return Err(ConfigError::InvalidConfiguration {
            message: "api.request_timeout_secs must be greater than 0".to_string(),
        });
    }

    let push_url = config.push_url();
    if !(push_url.starts_with("ws://") || push_url.starts_with("wss://")) {
        return Err(ConfigError::InvalidConfiguration {
            message: format!("push.url must start with ws:// or wss://, got '{push_url}'"),
        });
    }

    if config.reconnect_delay().is_zero() || config.reconnect_delay() > config.max_reconnect_delay()
    {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "push.reconnect_delay_ms ({}) must be non-zero and not exceed push.max_reconnect_delay_ms ({})",
                config.reconnect_delay().as_millis(),
                config.max_reconnect_delay().as_millis()
            ),
        });
    }

    config.role().parse::<Role>()?;

    Ok(())
}
