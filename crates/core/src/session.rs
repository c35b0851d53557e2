//! Server-side session store.
//!
//! One record per user under `session:{user_id}`, serialized as JSON and
//! written with a store-level expiry equal to the session TTL. A later
//! `create` for the same user overwrites the record, so only the most recent
//! login's token is honored.
//!
//! Expiry is enforced twice: the backing store drops the key once its TTL
//! elapses, and [`SessionStore::validate`] evicts a record whose embedded
//! `expires_at` has passed.
//!
//! Read-modify-write paths (refresh, lazy eviction) only write back if the
//! stored value is still the one they read, so a concurrent login or logout
//! always wins.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kv::{KeyValueStore, KvError};
use crate::types::{DbId, Timestamp};

/// Identity fields cached in the session so authenticated requests need no
/// user lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: DbId,
    pub email: String,
    pub fullname: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: DbId,
    pub bearer_token: String,
    pub user_snapshot: UserSnapshot,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

/// Outcome of checking a presented token against a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    Valid,
    TokenMismatch,
    Expired,
}

impl SessionRecord {
    /// Pure validity check; `now == expires_at` is still valid.
    pub fn check(&self, token: &str, now: Timestamp) -> SessionCheck {
        if self.bearer_token != token {
            SessionCheck::TokenMismatch
        } else if now > self.expires_at {
            SessionCheck::Expired
        } else {
            SessionCheck::Valid
        }
    }
}

/// Failures of the session store itself. "No session" is never an error.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt session record for user {user_id}: {reason}")]
    Corrupt { user_id: DbId, reason: String },
}

impl From<KvError> for SessionStoreError {
    fn from(e: KvError) -> Self {
        SessionStoreError::Unavailable(e.0)
    }
}

pub fn session_key(user_id: DbId) -> String {
    format!("session:{user_id}")
}

/// Session operations over an injected [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { kv, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn deadline(&self, from: Timestamp) -> Timestamp {
        chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| from.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn serialize(&self, record: &SessionRecord) -> Result<String, SessionStoreError> {
        serde_json::to_string(record).map_err(|e| SessionStoreError::Corrupt {
            user_id: record.user_id,
            reason: e.to_string(),
        })
    }

    async fn put(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        let json = self.serialize(record)?;
        self.kv
            .set_ex(&session_key(record.user_id), &json, self.ttl)
            .await?;
        Ok(())
    }

    /// Start a session for `user_id`, replacing any existing one.
    ///
    /// Returns the storage key of the new record.
    pub async fn create(
        &self,
        user_id: DbId,
        token: &str,
        snapshot: UserSnapshot,
    ) -> Result<String, SessionStoreError> {
        let now = Utc::now();
        let record = SessionRecord {
            user_id,
            bearer_token: token.to_string(),
            user_snapshot: snapshot,
            created_at: now,
            expires_at: self.deadline(now),
        };
        self.put(&record).await?;
        tracing::debug!(user_id, expires_at = %record.expires_at, "Session created");
        Ok(session_key(user_id))
    }

    pub async fn get(&self, user_id: DbId) -> Result<Option<SessionRecord>, SessionStoreError> {
        Ok(self.load(user_id).await?.map(|(_, record)| record))
    }

    /// Read the raw stored value alongside its decoded record. The raw value
    /// guards the conditional writes in `validate` and `refresh_record`.
    async fn load(
        &self,
        user_id: DbId,
    ) -> Result<Option<(String, SessionRecord)>, SessionStoreError> {
        let Some(raw) = self.kv.get(&session_key(user_id)).await? else {
            return Ok(None);
        };
        let record = serde_json::from_str(&raw).map_err(|e| SessionStoreError::Corrupt {
            user_id,
            reason: e.to_string(),
        })?;
        Ok(Some((raw, record)))
    }

    /// `true` iff a session exists, holds `token`, and has not expired.
    ///
    /// An expired record is evicted before returning `false`, unless a newer
    /// session replaced it in the meantime. A token mismatch leaves the
    /// record in place.
    pub async fn validate(&self, user_id: DbId, token: &str) -> Result<bool, SessionStoreError> {
        let Some((raw, record)) = self.load(user_id).await? else {
            return Ok(false);
        };
        match record.check(token, Utc::now()) {
            SessionCheck::Valid => Ok(true),
            SessionCheck::TokenMismatch => Ok(false),
            SessionCheck::Expired => {
                self.evict(user_id, &raw).await?;
                Ok(false)
            }
        }
    }

    /// Lazy eviction of the stale record `raw`.
    async fn evict(&self, user_id: DbId, raw: &str) -> Result<bool, SessionStoreError> {
        let removed = self.kv.delete_if(&session_key(user_id), raw).await?;
        tracing::debug!(user_id, removed, "Evicted expired session");
        Ok(removed)
    }

    /// Extend the session by one TTL from now. `None` when there is no
    /// session to extend, including when a login or logout replaced the
    /// record while it was being refreshed.
    pub async fn refresh_record(
        &self,
        user_id: DbId,
    ) -> Result<Option<SessionRecord>, SessionStoreError> {
        let Some((raw, mut record)) = self.load(user_id).await? else {
            return Ok(None);
        };
        record.expires_at = self.deadline(Utc::now());
        let json = self.serialize(&record)?;

        let replaced = self
            .kv
            .replace_ex(&session_key(user_id), &raw, &json, self.ttl)
            .await?;
        if !replaced {
            tracing::debug!(user_id, "Session changed during refresh; not extended");
            return Ok(None);
        }
        tracing::debug!(user_id, expires_at = %record.expires_at, "Session refreshed");
        Ok(Some(record))
    }

    pub async fn refresh(&self, user_id: DbId) -> Result<bool, SessionStoreError> {
        Ok(self.refresh_record(user_id).await?.is_some())
    }

    /// End the session. `true` iff one existed.
    pub async fn delete(&self, user_id: DbId) -> Result<bool, SessionStoreError> {
        let removed = self.kv.delete(&session_key(user_id)).await?;
        tracing::debug!(user_id, removed, "Session deleted");
        Ok(removed)
    }
}
