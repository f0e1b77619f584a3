//! Artifact store configuration parsed from environment variables.

use super::env_reader::EnvReader;
use anyhow::Result;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStoreKind {
    Memory,
    File,
    Sqlite,
}

impl FromStr for ArtifactStoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(ArtifactStoreKind::Memory),
            "file" => Ok(ArtifactStoreKind::File),
            "sqlite" => Ok(ArtifactStoreKind::Sqlite),
            _ => anyhow::bail!(
                "Invalid ARTIFACT_STORE: {}. Must be 'memory', 'file', or 'sqlite'",
                s
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PersistenceEnvConfig {
    pub artifact_store: ArtifactStoreKind,
    pub model_dir: PathBuf,
    pub database_url: String,
}

impl PersistenceEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_reader(&EnvReader::process())
    }

    pub fn from_reader(env: &EnvReader) -> Result<Self> {
        Ok(Self {
            artifact_store: ArtifactStoreKind::from_str(&env.string("ARTIFACT_STORE", "file"))?,
            model_dir: PathBuf::from(env.string("MODEL_DIR", "models")),
            database_url: env.string("DATABASE_URL", "sqlite://data/trendcast.db"),
        })
    }
}
