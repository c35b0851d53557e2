//! Authentication gate: a bearer token is honored only while the session it
//! was issued with still exists, still holds that exact token, and has not
//! expired.

use std::sync::Arc;

use agora_core::session::{SessionStore, UserSnapshot};
use agora_core::types::DbId;

use crate::auth::jwt::{verify_token, JwtConfig, TokenError};

/// The single authentication failure kind. The message says which check
/// failed; callers treat every variant as "not authenticated".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct AuthError(pub &'static str);

impl AuthError {
    pub const INVALID_TOKEN: AuthError = AuthError("invalid token");
    pub const SESSION_EXPIRED: AuthError = AuthError("session expired");
    pub const SESSION_INVALID: AuthError = AuthError("session invalid");
}

/// Identity of an authenticated request, taken from the session snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: DbId,
    pub user: UserSnapshot,
    /// The bearer credential the request presented.
    pub token: String,
}

#[derive(Clone)]
pub struct AuthGate {
    jwt: Arc<JwtConfig>,
    sessions: SessionStore,
}

impl AuthGate {
    pub fn new(jwt: Arc<JwtConfig>, sessions: SessionStore) -> Self {
        Self { jwt, sessions }
    }

    /// Resolve a bearer credential to an [`Identity`].
    ///
    /// Session-store faults are logged and reported as [`AuthError`] like any
    /// other failure.
    pub async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = verify_token(token, &self.jwt).map_err(|e| {
            match e {
                TokenError::Expired => tracing::debug!("Rejected expired token"),
                TokenError::Invalid => tracing::debug!("Rejected invalid token"),
            }
            AuthError::INVALID_TOKEN
        })?;
        let user_id = claims.sub;

        let record = match self.sessions.get(user_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!(user_id, "No session for token subject");
                return Err(AuthError::SESSION_EXPIRED);
            }
            Err(e) => {
                tracing::error!(user_id, error = %e, "Session lookup failed during authentication");
                return Err(AuthError::SESSION_EXPIRED);
            }
        };

        match self.sessions.validate(user_id, token).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(user_id, "Session rejected token");
                return Err(AuthError::SESSION_INVALID);
            }
            Err(e) => {
                tracing::error!(user_id, error = %e, "Session validation failed during authentication");
                return Err(AuthError::SESSION_INVALID);
            }
        }

        Ok(Identity {
            user_id,
            user: record.user_snapshot,
            token: token.to_string(),
        })
    }
}
