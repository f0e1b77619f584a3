//! In-memory artifact store.
//!
//! Artifacts are kept as serialized JSON so every `load` goes through the
//! same decode path as the durable stores. Data is lost on restart.

use crate::domain::errors::ForecastError;
use crate::domain::ml::ModelArtifact;
use crate::domain::repositories::ModelArtifactStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct InMemoryArtifactStore {
    artifacts: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self {
            artifacts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Stores raw content for `symbol`, bypassing serialization
    pub async fn insert_raw(&self, symbol: &str, content: &str) {
        self.artifacts
            .write()
            .await
            .insert(symbol.to_string(), content.to_string());
    }

    pub async fn len(&self) -> usize {
        self.artifacts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.artifacts.read().await.is_empty()
    }
}

impl Default for InMemoryArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelArtifactStore for InMemoryArtifactStore {
    async fn load(&self, symbol: &str) -> Result<Option<ModelArtifact>, ForecastError> {
        let artifacts = self.artifacts.read().await;
        artifacts
            .get(symbol)
            .map(|json| ModelArtifact::from_json(symbol, json))
            .transpose()
    }

    async fn save(&self, artifact: &ModelArtifact) -> Result<(), ForecastError> {
        let json = artifact.to_json()?;
        self.artifacts
            .write()
            .await
            .insert(artifact.symbol.clone(), json);
        Ok(())
    }

    async fn contains(&self, symbol: &str) -> Result<bool, ForecastError> {
        Ok(self.artifacts.read().await.contains_key(symbol))
    }

    async fn symbols(&self) -> Result<Vec<String>, ForecastError> {
        let mut symbols: Vec<String> = self.artifacts.read().await.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}
