//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.c4c/config.toml`
//! 3. **Project config** - `./.c4c/config.toml`
//! 4. **Environment** - `C4C_API_URL` (and `C4C_TOKEN`, read lazily)
//! 5. **CLI arguments** - Command-line flags (highest priority, applied by the CLI)

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::types::{ApiConfig, AuthConfig, CoinsConfig, PushConfig, SyncConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

const CONFIG_DIR: &str = ".c4c";
const CONFIG_FILE: &str = "config.toml";

fn is_file_not_found(e: &ConfigError) -> bool {
    matches!(e, ConfigError::IoError { source } if source.kind() == std::io::ErrorKind::NotFound)
}

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a present file cannot be parsed or the merged
/// configuration fails validation. Missing config files are not errors.
pub fn load_hierarchy() -> Result<CoinsConfig, ConfigError> {
    let mut config = CoinsConfig::default();

    if let Some(home) = dirs::home_dir() {
        config = merge_optional(config, &home.join(CONFIG_DIR).join(CONFIG_FILE))?;
    }

    let project_path = std::env::current_dir()?.join(CONFIG_DIR).join(CONFIG_FILE);
    config = merge_optional(config, &project_path)?;

    if let Ok(url) = std::env::var("C4C_API_URL")
        && !url.trim().is_empty()
    {
        config.api.base_url = Some(url);
    }

    validate_config(&config)?;

    Ok(config)
}

fn merge_optional(base: CoinsConfig, path: &Path) -> Result<CoinsConfig, ConfigError> {
    match load_config_file(path) {
        Ok(file_config) => {
            debug!(event = "core.config.file_loaded", path = %path.display());
            Ok(merge_configs(base, file_config))
        }
        Err(e) if is_file_not_found(&e) => Ok(base),
        Err(e) => Err(e),
    }
}

/// Load a single configuration file.
pub fn load_config_file(path: &Path) -> Result<CoinsConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Merge two configurations, with `override_config` taking precedence.
///
/// Override values replace base values only where present.
pub fn merge_configs(base: CoinsConfig, override_config: CoinsConfig) -> CoinsConfig {
    CoinsConfig {
        api: ApiConfig {
            base_url: override_config.api.base_url.or(base.api.base_url),
            request_timeout_secs: override_config
                .api
                .request_timeout_secs
                .or(base.api.request_timeout_secs),
        },
        push: PushConfig {
            url: override_config.push.url.or(base.push.url),
            enabled: override_config.push.enabled.or(base.push.enabled),
            reconnect_delay_ms: override_config
                .push
                .reconnect_delay_ms
                .or(base.push.reconnect_delay_ms),
            max_reconnect_delay_ms: override_config
                .push
                .max_reconnect_delay_ms
                .or(base.push.max_reconnect_delay_ms),
        },
        sync: SyncConfig {
            poll_interval_secs: override_config
                .sync
                .poll_interval_secs
                .or(base.sync.poll_interval_secs),
        },
        auth: AuthConfig {
            token: override_config.auth.token.or(base.auth.token),
            role: override_config.auth.role.or(base.auth.role),
        },
    }
}
