//! PostgreSQL implementation of MappingStore.
//!
//! Tickets live in a single `tickets` table. The primary key on
//! `channel_id` and the unique constraint on `user_id` make the database
//! the arbiter of one-ticket-per-user, even across processes.
//!
//! Snowflakes are unsigned 64-bit on the platform and stored as `BIGINT`;
//! the bit pattern is preserved in both directions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::foundation::{ChannelId, UserId};
use crate::domain::ticket::Ticket;
use crate::ports::{MappingStore, StoreError};

/// PostgreSQL implementation of MappingStore.
#[derive(Clone)]
pub struct PostgresMappingStore {
    pool: PgPool,
}

impl PostgresMappingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MappingStore for PostgresMappingStore {
    async fn find_channel_for_user(&self, user_id: UserId) -> Result<Option<ChannelId>, StoreError> {
        let row = sqlx::query("SELECT channel_id FROM tickets WHERE user_id = $1")
            .bind(to_db(user_id.get()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_unavailable("find channel for user", e))?;

        match row {
            Some(row) => {
                let raw: i64 = row
                    .try_get("channel_id")
                    .map_err(|e| db_unavailable("read channel_id", e))?;
                Ok(Some(channel_from_db(raw)?))
            }
            None => Ok(None),
        }
    }

    async fn find_user_for_channel(
        &self,
        channel_id: ChannelId,
    ) -> Result<Option<UserId>, StoreError> {
        let row = sqlx::query("SELECT user_id FROM tickets WHERE channel_id = $1")
            .bind(to_db(channel_id.get()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_unavailable("find user for channel", e))?;

        match row {
            Some(row) => {
                let raw: i64 = row
                    .try_get("user_id")
                    .map_err(|e| db_unavailable("read user_id", e))?;
                Ok(Some(user_from_db(raw)?))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, user_id: UserId, channel_id: ChannelId) -> Result<Ticket, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO tickets (channel_id, user_id)
            VALUES ($1, $2)
            RETURNING opened_at
            "#,
        )
        .bind(to_db(channel_id.get()))
        .bind(to_db(user_id.get()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                unique_violation(db_err.constraint(), user_id, channel_id)
            }
            _ => db_unavailable("insert ticket", e),
        })?;

        let opened_at: DateTime<Utc> = row
            .try_get("opened_at")
            .map_err(|e| db_unavailable("read opened_at", e))?;

        Ok(Ticket::reconstitute(user_id, channel_id, opened_at))
    }

    async fn delete(&self, user_id: UserId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tickets WHERE user_id = $1")
            .bind(to_db(user_id.get()))
            .execute(&self.pool)
            .await
            .map_err(|e| db_unavailable("delete ticket", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(user_id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| db_unavailable("ping", e))?;
        Ok(())
    }
}

/// Constraint backing the `channel_id` primary key.
const CHANNEL_KEY: &str = "tickets_pkey";

/// Names the side of the mapping that clashed on insert.
fn unique_violation(constraint: Option<&str>, user_id: UserId, channel_id: ChannelId) -> StoreError {
    match constraint {
        Some(CHANNEL_KEY) => StoreError::ChannelInUse(channel_id),
        _ => StoreError::AlreadyExists(user_id),
    }
}

fn db_unavailable(action: &str, e: sqlx::Error) -> StoreError {
    tracing::error!(error = %e, action, "Mapping store query failed");
    StoreError::unavailable(format!("failed to {}: {}", action, e))
}

fn to_db(id: u64) -> i64 {
    id as i64
}

fn from_db(raw: i64) -> u64 {
    raw as u64
}

fn user_from_db(raw: i64) -> Result<UserId, StoreError> {
    UserId::new(from_db(raw))
        .map_err(|e| StoreError::unavailable(format!("corrupt user_id {}: {}", raw, e)))
}

fn channel_from_db(raw: i64) -> Result<ChannelId, StoreError> {
    ChannelId::new(from_db(raw))
        .map_err(|e| StoreError::unavailable(format!("corrupt channel_id {}: {}", raw, e)))
}
