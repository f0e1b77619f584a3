use crate::domain::errors::ForecastError;
use crate::domain::ml::ModelArtifact;
use crate::domain::repositories::ModelArtifactStore;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

const ARTIFACT_SUFFIX: &str = "_artifact.json";

/// One JSON file per symbol under a model directory.
///
/// Saves go to a temporary file first and are renamed into place, so a
/// reader never observes a half-written artifact.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}{}", symbol, ARTIFACT_SUFFIX))
    }

    fn storage_error(&self, action: &str, path: &Path, e: std::io::Error) -> ForecastError {
        ForecastError::Storage {
            reason: format!("failed to {} {}: {}", action, path.display(), e),
        }
    }
}

#[async_trait]
impl ModelArtifactStore for FileArtifactStore {
    async fn load(&self, symbol: &str) -> Result<Option<ModelArtifact>, ForecastError> {
        let path = self.artifact_path(symbol);
        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(ForecastError::ArtifactCorrupt {
                    symbol: symbol.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(self.storage_error("read", &path, e)),
        };

        debug!("FileArtifactStore: Loaded {}", path.display());
        ModelArtifact::from_json(symbol, &json).map(Some)
    }

    async fn save(&self, artifact: &ModelArtifact) -> Result<(), ForecastError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| self.storage_error("create", &self.dir, e))?;

        let json = artifact.to_json()?;
        let path = self.artifact_path(&artifact.symbol);
        let staging = self
            .dir
            .join(format!(".{}.{}.tmp", artifact.symbol, Uuid::new_v4()));

        if let Err(e) = fs::write(&staging, json).await {
            let _ = fs::remove_file(&staging).await;
            return Err(self.storage_error("write", &staging, e));
        }
        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(self.storage_error("replace", &path, e));
        }

        info!(
            "FileArtifactStore: Saved {} (run {}) to {}",
            artifact.symbol,
            artifact.run_id,
            path.display()
        );
        Ok(())
    }

    async fn contains(&self, symbol: &str) -> Result<bool, ForecastError> {
        let path = self.artifact_path(symbol);
        fs::try_exists(&path)
            .await
            .map_err(|e| self.storage_error("inspect", &path, e))
    }

    async fn symbols(&self) -> Result<Vec<String>, ForecastError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.storage_error("list", &self.dir, e)),
        };

        let mut symbols = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.storage_error("list", &self.dir, e))?
        {
            let name = entry.file_name();
            if let Some(symbol) = name
                .to_str()
                .and_then(|n| n.strip_suffix(ARTIFACT_SUFFIX))
                .filter(|s| !s.is_empty() && !s.starts_with('.'))
            {
                symbols.push(symbol.to_string());
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::artifact::tests::sample_artifact;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("trendcast-store-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let store = FileArtifactStore::new(scratch_dir());
        assert!(store.load("AAPL").await.unwrap().is_none());
        assert!(store.symbols().await.unwrap().is_empty());
        assert!(!store.contains("AAPL").await.unwrap());
    }

    #[tokio::test]
    async fn test_save_load_and_replace() {
        let dir = scratch_dir();
        let store = FileArtifactStore::new(&dir);

        let first = sample_artifact("AAPL", 5);
        store.save(&first).await.unwrap();
        let second = sample_artifact("AAPL", 5);
        store.save(&second).await.unwrap();
        store.save(&sample_artifact("MSFT", 5)).await.unwrap();

        let loaded = store.load("AAPL").await.unwrap().unwrap();
        assert_eq!(loaded.run_id, second.run_id);
        assert!(store.artifact_path("AAPL").ends_with("AAPL_artifact.json"));
        assert_eq!(store.symbols().await.unwrap(), vec!["AAPL", "MSFT"]);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_corrupt_file_reported() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let store = FileArtifactStore::new(&dir);
        std::fs::write(store.artifact_path("TSLA"), "truncated{").unwrap();

        assert!(matches!(
            store.load("TSLA").await,
            Err(ForecastError::ArtifactCorrupt { .. })
        ));

        let _ = std::fs::remove_dir_all(dir);
    }
}
