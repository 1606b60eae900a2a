use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use crate::errors::ApiError;

/// The persisted agent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub model: String,
    pub system_message: String,
    pub user_name: String,
    pub agent_name: String,
}

/// One-row SQLite store for the agent profile. Every write replaces the
/// whole row inside a transaction, so exactly one row exists after any
/// write.
pub struct AgentStore {
    pool: SqlitePool,
    defaults: AgentProfile,
}

impl AgentStore {
    pub async fn new(db_path: PathBuf, defaults: AgentProfile) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let store = Self { pool, defaults };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS agent_profile (
                model TEXT NOT NULL,
                system_message TEXT NOT NULL,
                user_name TEXT NOT NULL,
                agent_name TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(())
    }

    /// Current profile; inserts the defaults on first read.
    pub async fn active(&self) -> Result<AgentProfile, ApiError> {
        let row = sqlx::query(
            "SELECT model, system_message, user_name, agent_name FROM agent_profile LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        match row {
            Some(row) => Ok(AgentProfile {
                model: row.get("model"),
                system_message: row.get("system_message"),
                user_name: row.get("user_name"),
                agent_name: row.get("agent_name"),
            }),
            None => {
                let defaults = self.defaults.clone();
                self.replace(&defaults).await?;
                Ok(defaults)
            }
        }
    }

    /// Overwrites the stored profile: delete all rows, insert the new
    /// one, commit.
    pub async fn replace(&self, profile: &AgentProfile) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::internal)?;

        sqlx::query("DELETE FROM agent_profile")
            .execute(&mut *tx)
            .await
            .map_err(ApiError::internal)?;

        sqlx::query(
            "INSERT INTO agent_profile (model, system_message, user_name, agent_name)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&profile.model)
        .bind(&profile.system_message)
        .bind(&profile.user_name)
        .bind(&profile.agent_name)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::internal)?;

        tx.commit().await.map_err(ApiError::internal)?;
        Ok(())
    }
}
