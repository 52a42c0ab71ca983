//! Link tracker service configuration
//!
//! Values come from defaults, optionally overridden by a TOML or JSON file and
//! then by `GRAFT_TRACKER_*` environment variables.

use graft_core::GraftError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`LinkTrackerServiceConfig::command_buffer_size`]
pub const ENV_COMMAND_BUFFER_SIZE: &str = "GRAFT_TRACKER_COMMAND_BUFFER_SIZE";

/// Environment variable overriding [`LinkTrackerServiceConfig::command_timeout_ms`]
pub const ENV_COMMAND_TIMEOUT_MS: &str = "GRAFT_TRACKER_COMMAND_TIMEOUT_MS";

/// Runtime configuration for [`LinkTrackerHandle`](crate::service::LinkTrackerHandle)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkTrackerServiceConfig {
    /// Capacity of the command channel feeding the tracker task
    pub command_buffer_size: usize,
    /// How long a caller waits for a reply, in milliseconds
    pub command_timeout_ms: u64,
}

impl Default for LinkTrackerServiceConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: 1024,
            command_timeout_ms: 5_000,
        }
    }
}

impl LinkTrackerServiceConfig {
    /// Reply timeout as a [`Duration`]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, GraftError> {
        toml::from_str(content).map_err(|e| GraftError::invalid(format!("Invalid TOML: {e}")))
    }

    /// Load from a `.toml` or `.json` file
    pub fn load_from_file(path: &Path) -> Result<Self, GraftError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GraftError::internal(format!("Failed to read config file: {e}")))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| GraftError::invalid(format!("Invalid JSON: {e}")))?,
            _ => return Err(GraftError::invalid("Unsupported file format")),
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply `GRAFT_TRACKER_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<(), GraftError> {
        self.merge_with_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup`
    pub fn merge_with_vars(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), GraftError> {
        if let Some(value) = lookup(ENV_COMMAND_BUFFER_SIZE) {
            self.command_buffer_size = value.parse().map_err(|_| {
                GraftError::invalid(format!("Invalid buffer size in {ENV_COMMAND_BUFFER_SIZE}"))
            })?;
        }
        if let Some(value) = lookup(ENV_COMMAND_TIMEOUT_MS) {
            self.command_timeout_ms = value.parse().map_err(|_| {
                GraftError::invalid(format!("Invalid timeout in {ENV_COMMAND_TIMEOUT_MS}"))
            })?;
        }
        self.validate()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), GraftError> {
        if self.command_buffer_size == 0 {
            return Err(GraftError::invalid("command_buffer_size must be positive"));
        }
        if self.command_timeout_ms == 0 {
            return Err(GraftError::invalid("command_timeout_ms must be positive"));
        }
        Ok(())
    }
}
