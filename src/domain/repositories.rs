//! Persistence abstraction for trained model artifacts.
//!
//! One artifact per symbol. Saving replaces the previous artifact atomically,
//! so a concurrent `load` sees either the old or the new artifact in full.
//!
//! # Example
//!
//! ```rust,no_run
//! use trendcast::domain::repositories::ModelArtifactStore;
//! use trendcast::infrastructure::InMemoryArtifactStore;
//!
//! # async {
//! let store = InMemoryArtifactStore::new();
//! let artifact = store.load("AAPL").await;
//! # };
//! ```

use crate::domain::errors::ForecastError;
use crate::domain::ml::ModelArtifact;
use async_trait::async_trait;

#[async_trait]
pub trait ModelArtifactStore: Send + Sync {
    /// `Ok(None)` when nothing was ever saved for `symbol`;
    /// `ArtifactCorrupt` when something was saved but cannot be read back.
    async fn load(&self, symbol: &str) -> Result<Option<ModelArtifact>, ForecastError>;

    async fn save(&self, artifact: &ModelArtifact) -> Result<(), ForecastError>;

    async fn contains(&self, symbol: &str) -> Result<bool, ForecastError> {
        Ok(self.load(symbol).await?.is_some())
    }

    /// Symbols with a stored artifact, sorted
    async fn symbols(&self) -> Result<Vec<String>, ForecastError>;
}
