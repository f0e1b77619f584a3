use crate::domain::errors::ForecastError;
use crate::domain::ml::ModelArtifact;
use crate::domain::repositories::ModelArtifactStore;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Artifacts as JSON rows in `model_artifacts`, one row per symbol
pub struct SqliteArtifactStore {
    pool: SqlitePool,
}

impl SqliteArtifactStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn storage(e: sqlx::Error) -> ForecastError {
    ForecastError::Storage {
        reason: e.to_string(),
    }
}

#[async_trait]
impl ModelArtifactStore for SqliteArtifactStore {
    async fn load(&self, symbol: &str) -> Result<Option<ModelArtifact>, ForecastError> {
        let row = sqlx::query("SELECT artifact_json FROM model_artifacts WHERE symbol = ?")
            .bind(symbol)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        if let Some(row) = row {
            let json: String = row.try_get("artifact_json").map_err(storage)?;
            ModelArtifact::from_json(symbol, &json).map(Some)
        } else {
            Ok(None)
        }
    }

    async fn save(&self, artifact: &ModelArtifact) -> Result<(), ForecastError> {
        let json = artifact.to_json()?;
        sqlx::query(
            r#"
            INSERT INTO model_artifacts (symbol, run_id, trained_at, sequence_length, artifact_json)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(symbol) DO UPDATE SET
                run_id = excluded.run_id,
                trained_at = excluded.trained_at,
                sequence_length = excluded.sequence_length,
                artifact_json = excluded.artifact_json
            "#,
        )
        .bind(&artifact.symbol)
        .bind(artifact.run_id.to_string())
        .bind(artifact.trained_at.timestamp())
        .bind(artifact.sequence_length as i64)
        .bind(json)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        info!(
            "Persisted model artifact for {} (run {})",
            artifact.symbol, artifact.run_id
        );
        Ok(())
    }

    async fn contains(&self, symbol: &str) -> Result<bool, ForecastError> {
        let row = sqlx::query("SELECT 1 FROM model_artifacts WHERE symbol = ?")
            .bind(symbol)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        Ok(row.is_some())
    }

    async fn symbols(&self) -> Result<Vec<String>, ForecastError> {
        let rows = sqlx::query("SELECT symbol FROM model_artifacts ORDER BY symbol")
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        let mut symbols = Vec::with_capacity(rows.len());
        for row in rows {
            symbols.push(row.try_get("symbol").map_err(storage)?);
        }
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::artifact::tests::sample_artifact;
    use crate::infrastructure::persistence::database::Database;

    async fn store() -> SqliteArtifactStore {
        let db = Database::new("sqlite::memory:").await.unwrap();
        SqliteArtifactStore::new(db.pool)
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_per_symbol() {
        let store = store().await;
        assert!(store.load("AAPL").await.unwrap().is_none());

        store.save(&sample_artifact("AAPL", 5)).await.unwrap();
        let latest = sample_artifact("AAPL", 5);
        store.save(&latest).await.unwrap();
        store.save(&sample_artifact("GOOGL", 5)).await.unwrap();

        let loaded = store.load("AAPL").await.unwrap().unwrap();
        assert_eq!(loaded.run_id, latest.run_id);
        assert_eq!(store.symbols().await.unwrap(), vec!["AAPL", "GOOGL"]);
        assert!(store.contains("GOOGL").await.unwrap());
    }

    #[tokio::test]
    async fn test_unreadable_row_is_corrupt() {
        let store = store().await;
        sqlx::query(
            "INSERT INTO model_artifacts (symbol, run_id, trained_at, sequence_length, artifact_json) VALUES ('NVDA', 'x', 0, 5, '[]')",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        assert!(matches!(
            store.load("NVDA").await,
            Err(ForecastError::ArtifactCorrupt { .. })
        ));
    }
}
