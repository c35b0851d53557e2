//! Postgres-backed [`KeyValueStore`] over the `kv_store` table.
//!
//! Each entry carries an absolute `expires_at`; reads ignore expired rows and
//! [`KeyValueStore::purge_expired`] deletes them in bulk. The conditional
//! writes compare and update in a single statement, so the row lock makes
//! them atomic against concurrent upserts.

use std::time::Duration;

use agora_core::kv::{KeyValueStore, KvError};
use async_trait::async_trait;
use sqlx::PgPool;

#[derive(Debug, Clone)]
pub struct PgKeyValueStore {
    pool: PgPool,
}

impl PgKeyValueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unavailable(err: sqlx::Error) -> KvError {
    tracing::error!(error = %err, "Key-value store query failed");
    KvError(err.to_string())
}

#[async_trait]
impl KeyValueStore for PgKeyValueStore {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        sqlx::query(
            "INSERT INTO kv_store (key, value, expires_at)
             VALUES ($1, $2, NOW() + make_interval(secs => $3))
             ON CONFLICT (key) DO UPDATE
                SET value = EXCLUDED.value,
                    expires_at = EXCLUDED.expires_at",
        )
        .bind(key)
        .bind(value)
        .bind(ttl.as_secs_f64())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM kv_store WHERE key = $1 AND expires_at > NOW()")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(unavailable)?;
        Ok(row.map(|(value,)| value))
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        let row: Option<(bool,)> =
            sqlx::query_as("DELETE FROM kv_store WHERE key = $1 RETURNING expires_at > NOW()")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(unavailable)?;
        Ok(row.is_some_and(|(live,)| live))
    }

    async fn replace_ex(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, KvError> {
        let result = sqlx::query(
            "UPDATE kv_store
             SET value = $3,
                 expires_at = NOW() + make_interval(secs => $4)
             WHERE key = $1 AND value = $2 AND expires_at > NOW()",
        )
        .bind(key)
        .bind(expected)
        .bind(value)
        .bind(ttl.as_secs_f64())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_if(&self, key: &str, expected: &str) -> Result<bool, KvError> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = $1 AND value = $2")
            .bind(key)
            .bind(expected)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(result.rows_affected() == 1)
    }

    async fn purge_expired(&self) -> Result<u64, KvError> {
        let result = sqlx::query("DELETE FROM kv_store WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(result.rows_affected())
    }
}
