//! Implementation of the SeenStore trait for SqliteStateRepository

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::persistence::{
    error::PersistenceError, sqlite::SqliteStateRepository, traits::SeenStore,
};

impl SqliteStateRepository {
    /// Inserts a seen record with an explicit detection time (unix seconds).
    /// Existing records are left untouched.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn mark_with_timestamp(
        &self,
        address: &str,
        detected_at: i64,
    ) -> Result<bool, PersistenceError> {
        let address = address.to_lowercase();
        let result = self
            .execute_query_with_error_handling(
                "mark contract as seen",
                sqlx::query(
                    "INSERT OR IGNORE INTO seen_contracts (address, detected_at) VALUES (?, ?)",
                )
                .bind(&address)
                .bind(detected_at)
                .execute(&self.pool),
            )
            .await?;

        let inserted = result.rows_affected() == 1;
        tracing::debug!(address = %address, inserted, "Seen record written.");
        Ok(inserted)
    }

    /// Number of seen records currently stored.
    pub async fn seen_count(&self) -> Result<u64, PersistenceError> {
        let count: i64 = self
            .execute_query_with_error_handling(
                "count seen contracts",
                sqlx::query_scalar("SELECT COUNT(*) FROM seen_contracts").fetch_one(&self.pool),
            )
            .await?;
        u64::try_from(count).map_err(|e| PersistenceError::OperationFailed(e.to_string()))
    }
}

#[async_trait]
impl SeenStore for SqliteStateRepository {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn has(&self, address: &str) -> Result<bool, PersistenceError> {
        let row: Option<i64> = self
            .execute_query_with_error_handling(
                "query seen contract",
                sqlx::query_scalar("SELECT 1 FROM seen_contracts WHERE address = ?")
                    .bind(address.to_lowercase())
                    .fetch_optional(&self.pool),
            )
            .await?;
        Ok(row.is_some())
    }

    async fn mark(&self, address: &str) -> Result<bool, PersistenceError> {
        self.mark_with_timestamp(address, Utc::now().timestamp()).await
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn sweep(&self, retention: Duration) -> Result<u64, PersistenceError> {
        let retention_secs = i64::try_from(retention.as_secs())
            .map_err(|e| PersistenceError::InvalidInput(e.to_string()))?;
        let cutoff = Utc::now().timestamp().saturating_sub(retention_secs);

        let result = self
            .execute_query_with_error_handling(
                "sweep seen contracts",
                sqlx::query("DELETE FROM seen_contracts WHERE detected_at < ?")
                    .bind(cutoff)
                    .execute(&self.pool),
            )
            .await?;

        let removed = result.rows_affected();
        tracing::info!(removed, cutoff, "Swept expired seen records.");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SqliteStateRepository {
        let repo = SqliteStateRepository::new("sqlite::memory:", 1)
            .await
            .expect("Failed to connect to in-memory db");
        repo.run_migrations().await.expect("Failed to run migrations");
        repo
    }

    const ADDR: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    #[tokio::test]
    async fn test_mark_then_has() {
        let repo = setup_test_db().await;

        assert!(!repo.has(ADDR).await.unwrap());
        assert!(repo.mark(ADDR).await.unwrap());
        for _ in 0..3 {
            assert!(repo.has(ADDR).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_mark_is_idempotent() {
        let repo = setup_test_db().await;

        assert!(repo.mark(ADDR).await.unwrap());
        assert!(!repo.mark(ADDR).await.unwrap());
        assert_eq!(repo.seen_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_address_comparison_is_case_insensitive() {
        let repo = setup_test_db().await;

        repo.mark(&ADDR.to_uppercase().replace("0X", "0x")).await.unwrap();

        assert!(repo.has(&ADDR.to_lowercase()).await.unwrap());
        assert!(repo.has(ADDR).await.unwrap());
        assert!(!repo.mark(&ADDR.to_lowercase()).await.unwrap());
        assert_eq!(repo.seen_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_does_not_refresh_detected_at() {
        let repo = setup_test_db().await;
        let old = Utc::now().timestamp() - 40 * 86_400;

        repo.mark_with_timestamp(ADDR, old).await.unwrap();
        repo.mark(ADDR).await.unwrap();

        let removed = repo.sweep(Duration::from_secs(30 * 86_400)).await.unwrap();
        assert_eq!(removed, 1);
        assert!(!repo.has(ADDR).await.unwrap());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_records() {
        let repo = setup_test_db().await;
        let now = Utc::now().timestamp();

        repo.mark_with_timestamp("0xaaaa", now - 31 * 86_400).await.unwrap();
        repo.mark_with_timestamp("0xbbbb", now - 29 * 86_400).await.unwrap();
        repo.mark("0xcccc").await.unwrap();

        let removed = repo.sweep(Duration::from_secs(30 * 86_400)).await.unwrap();

        assert_eq!(removed, 1);
        assert!(!repo.has("0xaaaa").await.unwrap());
        assert!(repo.has("0xbbbb").await.unwrap());
        assert!(repo.has("0xcccc").await.unwrap());
    }

    #[tokio::test]
    async fn test_sweep_on_empty_store() {
        let repo = setup_test_db().await;
        assert_eq!(repo.sweep(Duration::from_secs(86_400)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let repo = setup_test_db().await;
        repo.close().await;

        assert!(matches!(repo.has(ADDR).await, Err(PersistenceError::OperationFailed(_))));
        assert!(matches!(repo.mark(ADDR).await, Err(PersistenceError::OperationFailed(_))));
    }

    #[tokio::test]
    async fn test_concurrent_marks_create_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("seen.db").display());
        let repo = std::sync::Arc::new(SqliteStateRepository::new(&url, 4).await.unwrap());
        repo.run_migrations().await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.mark(ADDR).await.unwrap() })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(repo.seen_count().await.unwrap(), 1);
    }
}
