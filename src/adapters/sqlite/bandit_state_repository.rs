//! SQLite implementation of the BanditStateRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::ports::BanditStateRepository;

#[derive(Clone)]
pub struct SqliteBanditStateRepository {
    pool: SqlitePool,
}

impl SqliteBanditStateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BanditStateRepository for SqliteBanditStateRepository {
    async fn load(&self, learner_id: &str) -> DomainResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT state_json FROM bandit_state WHERE learner_id = ?")
            .bind(learner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(blob,)| blob))
    }

    async fn save(&self, learner_id: &str, blob: &str) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO bandit_state (learner_id, state_json, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT(learner_id) DO UPDATE SET
                   state_json = excluded.state_json,
                   updated_at = excluded.updated_at"#,
        )
        .bind(learner_id)
        .bind(blob)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
