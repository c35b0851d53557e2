//! JWT access-token issuing and verification.
//!
//! Access tokens are HS256-signed JWTs containing a [`Claims`] payload. A
//! token only proves identity; whether it is still honored is decided by the
//! session store (see [`crate::auth::gate`]).

use agora_core::types::DbId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4); two logins in the same second
    /// still get distinct tokens.
    pub jti: String,
}

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 30). Sessions share it.
    pub access_token_expiry_mins: i64,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 30;

/// Longest accepted access token lifetime (one year). Larger values would
/// overflow token and session deadlines.
pub const MAX_ACCESS_EXPIRY_MINS: i64 = 60 * 24 * 365;

/// Parse `JWT_ACCESS_EXPIRY_MINS`, which must lie in `1..=MAX_ACCESS_EXPIRY_MINS`.
fn parse_expiry_mins(raw: &str) -> Result<i64, String> {
    let mins: i64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("JWT_ACCESS_EXPIRY_MINS must be an integer: {e}"))?;
    if !(1..=MAX_ACCESS_EXPIRY_MINS).contains(&mins) {
        return Err(format!(
            "JWT_ACCESS_EXPIRY_MINS must be between 1 and {MAX_ACCESS_EXPIRY_MINS}, got {mins}"
        ));
    }
    Ok(mins)
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty, or if the expiry is not
    /// an integer in `1..=MAX_ACCESS_EXPIRY_MINS`.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins = match std::env::var("JWT_ACCESS_EXPIRY_MINS") {
            Ok(raw) => parse_expiry_mins(&raw).unwrap_or_else(|e| panic!("{e}")),
            Err(_) => DEFAULT_ACCESS_EXPIRY_MINS,
        };

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins.saturating_mul(60)
    }
}

/// Issue an HS256 token for `user_id` valid for `ttl_secs` seconds.
pub fn issue_token(
    user_id: DbId,
    ttl_secs: i64,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        exp: now.saturating_add(ttl_secs),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Issue an access token with the configured lifetime.
pub fn generate_access_token(
    user_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    issue_token(user_id, config.access_ttl_secs(), config)
}

/// Verify signature, algorithm, and expiry, returning the embedded [`Claims`].
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}
