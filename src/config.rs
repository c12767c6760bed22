use std::time::Duration;

use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::{
    externals::host_telemetry::cache::DEFAULT_CACHE_TTL, internals::sampler::SamplerConfig,
};

pub const LOG_LEVEL_VAR: &str = "TELEMETRY_LOG_LEVEL";
pub const CHANNEL_CAPACITY_VAR: &str = "TELEMETRY_CHANNEL_CAPACITY";
pub const CACHE_TTL_VAR: &str = "TELEMETRY_CACHE_TTL_MS";

/// Runtime settings of the sampler binary. The polling interval is fixed
/// and deliberately absent.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: LevelFilter,
    pub sampler: SamplerConfig,
    pub cache_ttl: Duration,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}.")]
    Invalid { key: &'static str, value: String },
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::INFO,
            sampler: SamplerConfig::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup, falling back to defaults for
    /// keys that are not set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(LOG_LEVEL_VAR) {
            config.log_level = value
                .parse()
                .map_err(|_| invalid(LOG_LEVEL_VAR, &value))?;
        }

        if let Some(value) = lookup(CHANNEL_CAPACITY_VAR) {
            config.sampler.channel_capacity = match value.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => return Err(invalid(CHANNEL_CAPACITY_VAR, &value)),
            };
        }

        if let Some(value) = lookup(CACHE_TTL_VAR) {
            let millis = value
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid(CACHE_TTL_VAR, &value))?;
            config.cache_ttl = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}
