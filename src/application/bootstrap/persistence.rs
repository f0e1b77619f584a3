use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::{ArtifactStoreKind, PersistenceEnvConfig};
use crate::domain::repositories::ModelArtifactStore;
use crate::infrastructure::persistence::database::Database;
use crate::infrastructure::persistence::stores::{
    FileArtifactStore, InMemoryArtifactStore, SqliteArtifactStore,
};

pub struct PersistenceHandle {
    /// Present only for the SQLite backend
    pub db: Option<Database>,
    pub artifact_store: Arc<dyn ModelArtifactStore>,
}

pub struct PersistenceBootstrap;

impl PersistenceBootstrap {
    pub async fn init(config: &PersistenceEnvConfig) -> Result<PersistenceHandle> {
        match config.artifact_store {
            ArtifactStoreKind::Memory => {
                info!("Model artifacts kept in memory only");
                Ok(PersistenceHandle {
                    db: None,
                    artifact_store: Arc::new(InMemoryArtifactStore::new()),
                })
            }
            ArtifactStoreKind::File => {
                info!("Model artifacts stored under {}", config.model_dir.display());
                Ok(PersistenceHandle {
                    db: None,
                    artifact_store: Arc::new(FileArtifactStore::new(config.model_dir.clone())),
                })
            }
            ArtifactStoreKind::Sqlite => {
                info!("Initializing Database at {}", config.database_url);
                let db = Database::new(&config.database_url)
                    .await
                    .context("Failed to initialize database")?;
                let store = Arc::new(SqliteArtifactStore::new(db.pool.clone()));
                Ok(PersistenceHandle {
                    db: Some(db),
                    artifact_store: store,
                })
            }
        }
    }
}
