//! Observability configuration parsing from environment variables.
//!
//! This module handles loading the push-only metrics reporter settings.

use super::env_reader::EnvReader;
use anyhow::Result;

/// Observability environment configuration
#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
    /// Seconds between metrics snapshots
    pub interval_seconds: u64,
    /// Seconds between recommendation board refreshes in the server
    pub refresh_interval_seconds: u64,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 60,
            refresh_interval_seconds: 900,
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_reader(&EnvReader::process())
    }

    pub fn from_reader(env: &EnvReader) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            enabled: env.parse_bool("OBSERVABILITY_ENABLED", defaults.enabled),
            interval_seconds: env.parse("OBSERVABILITY_INTERVAL", defaults.interval_seconds)?,
            refresh_interval_seconds: env
                .parse("REFRESH_INTERVAL", defaults.refresh_interval_seconds)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observability_config_defaults() {
        let config = ObservabilityEnvConfig::from_reader(&EnvReader::from_pairs(&[])).unwrap();
        assert!(config.enabled);
        assert_eq!(config.interval_seconds, 60);
    }

    #[test]
    fn test_unparseable_flag_keeps_default() {
        let env = EnvReader::from_pairs(&[("OBSERVABILITY_ENABLED", "maybe")]);
        assert!(ObservabilityEnvConfig::from_reader(&env).unwrap().enabled);
    }
}
