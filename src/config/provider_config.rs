//! Price history provider configuration parsed from environment variables.

use super::env_reader::EnvReader;
use anyhow::Result;
use std::str::FromStr;

/// Where price history comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Mock,
    Yahoo,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(Mode::Mock),
            "yahoo" => Ok(Mode::Yahoo),
            _ => anyhow::bail!("Invalid MODE: {}. Must be 'mock' or 'yahoo'", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderEnvConfig {
    pub mode: Mode,
    pub yahoo_base_url: String,
    pub cache_ttl_seconds: u64,
    pub mock_seed: u64,
}

impl ProviderEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_reader(&EnvReader::process())
    }

    pub fn from_reader(env: &EnvReader) -> Result<Self> {
        Ok(Self {
            mode: Mode::from_str(&env.string("MODE", "mock"))?,
            yahoo_base_url: env.string("YAHOO_BASE_URL", "https://query1.finance.yahoo.com"),
            cache_ttl_seconds: env.parse("PRICE_CACHE_TTL_SECONDS", 60)?,
            mock_seed: env.parse("MOCK_SEED", 7)?,
        })
    }
}
