//! Implementation of the CursorStore trait for SqliteStateRepository

use async_trait::async_trait;

use crate::persistence::{
    error::PersistenceError, sqlite::SqliteStateRepository, traits::CursorStore,
};

fn cursor_key(network_id: &str) -> String {
    format!("cursor:{network_id}")
}

#[async_trait]
impl CursorStore for SqliteStateRepository {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn get_last_processed_block(
        &self,
        network_id: &str,
    ) -> Result<Option<u64>, PersistenceError> {
        tracing::debug!(network_id, "Querying for last processed block.");

        let value: Option<String> = self
            .execute_query_with_error_handling(
                "query last processed block",
                sqlx::query_scalar("SELECT value FROM application_state WHERE key = ?")
                    .bind(cursor_key(network_id))
                    .fetch_optional(&self.pool),
            )
            .await?;

        match value {
            Some(value) => {
                let block_number: u64 = serde_json::from_str(&value).map_err(|e| {
                    tracing::error!(error = %e, network_id, "Stored cursor is not a block number.");
                    PersistenceError::CorruptValue(e.to_string())
                })?;
                tracing::debug!(network_id, block_number, "Last processed block found.");
                Ok(Some(block_number))
            }
            None => {
                tracing::debug!(network_id, "No last processed block found.");
                Ok(None)
            }
        }
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn set_last_processed_block(
        &self,
        network_id: &str,
        block_number: u64,
    ) -> Result<(), PersistenceError> {
        let value = serde_json::to_string(&block_number)
            .map_err(|e| PersistenceError::CorruptValue(e.to_string()))?;

        self.execute_query_with_error_handling(
            "set last processed block",
            sqlx::query("INSERT OR REPLACE INTO application_state (key, value) VALUES (?, ?)")
                .bind(cursor_key(network_id))
                .bind(value)
                .execute(&self.pool),
        )
        .await?;

        tracing::debug!(network_id, block_number, "Last processed block set successfully.");
        Ok(())
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

    #[tokio::test]
    async fn test_get_and_set_last_processed_block() {
        let repo = setup_test_db().await;
        let network = "story";

        assert_eq!(repo.get_last_processed_block(network).await.unwrap(), None);

        repo.set_last_processed_block(network, 100).await.unwrap();
        assert_eq!(repo.get_last_processed_block(network).await.unwrap(), Some(100));

        repo.set_last_processed_block(network, 101).await.unwrap();
        assert_eq!(repo.get_last_processed_block(network).await.unwrap(), Some(101));
    }

    #[tokio::test]
    async fn test_cursors_are_scoped_by_network() {
        let repo = setup_test_db().await;

        repo.set_last_processed_block("story", 7).await.unwrap();
        repo.set_last_processed_block("aeneid", 9).await.unwrap();

        assert_eq!(repo.get_last_processed_block("story").await.unwrap(), Some(7));
        assert_eq!(repo.get_last_processed_block("aeneid").await.unwrap(), Some(9));
    }

    #[tokio::test]
    async fn test_corrupt_cursor_is_a_serialization_error() {
        let repo = setup_test_db().await;
        sqlx::query("INSERT INTO application_state (key, value) VALUES ('cursor:story', 'abc')")
            .execute(repo.pool())
            .await
            .unwrap();

        let result = repo.get_last_processed_block("story").await;
        assert!(matches!(result, Err(PersistenceError::CorruptValue(_))));
    }
}
