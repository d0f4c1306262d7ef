//! Store configuration.
//!
//! Defaults suit a single long-lived runtime. Every knob can be overridden
//! from the environment:
//!
//! | Variable                        | Field                   | Format            |
//! |---------------------------------|-------------------------|-------------------|
//! | `RECLASS_HANDLE_CACHE_CAPACITY` | `handle_cache_capacity` | unsigned integer  |
//! | `RECLASS_EVICT_ON_REDEFINE`     | `evict_on_redefine`     | boolean (`1`/`0`) |

use thiserror::Error;

/// Environment variable overriding [`StoreConfig::handle_cache_capacity`].
pub const HANDLE_CACHE_CAPACITY_VAR: &str = "RECLASS_HANDLE_CACHE_CAPACITY";
/// Environment variable overriding [`StoreConfig::evict_on_redefine`].
pub const EVICT_ON_REDEFINE_VAR: &str = "RECLASS_EVICT_ON_REDEFINE";

/// Default bound on cached member handles.
pub const DEFAULT_HANDLE_CACHE_CAPACITY: usize = 65_536;

/// Configuration values that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: expected an unsigned integer, got `{value}`")]
    InvalidInteger { var: &'static str, value: String },

    #[error("{var}: expected a boolean (1/0, true/false, yes/no, on/off), got `{value}`")]
    InvalidBool { var: &'static str, value: String },
}

/// Tunables for a [`MetadataStore`](crate::MetadataStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of handles the resolution cache holds. Zero disables
    /// the bound.
    pub handle_cache_capacity: usize,
    /// Drop cached handle resolutions for a type whenever a new snapshot of
    /// it is published.
    pub evict_on_redefine: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            handle_cache_capacity: DEFAULT_HANDLE_CACHE_CAPACITY,
            evict_on_redefine: true,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn with_handle_cache_capacity(mut self, capacity: usize) -> Self {
        self.handle_cache_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_evict_on_redefine(mut self, evict: bool) -> Self {
        self.evict_on_redefine = evict;
        self
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = StoreConfig::default();
        if let Some(value) = lookup(HANDLE_CACHE_CAPACITY_VAR) {
            config.handle_cache_capacity = parse_usize(HANDLE_CACHE_CAPACITY_VAR, &value)?;
        }
        if let Some(value) = lookup(EVICT_ON_REDEFINE_VAR) {
            config.evict_on_redefine = parse_bool(EVICT_ON_REDEFINE_VAR, &value)?;
        }
        Ok(config)
    }
}

fn parse_usize(var: &'static str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidInteger {
            var,
            value: value.to_owned(),
        })
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_owned(),
        }),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
