use agora_core::pagination::{PageLimits, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use axum::http::HeaderValue;

use crate::auth::jwt::JwtConfig;

/// Which key-value backend holds session records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    /// The `kv_store` table in the main database.
    Postgres,
    /// Process-local memory. Sessions do not survive a restart.
    Memory,
}

impl std::str::FromStr for SessionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(SessionBackend::Postgres),
            "memory" => Ok(SessionBackend::Memory),
            other => Err(format!(
                "unknown session backend '{other}' (expected 'postgres' or 'memory')"
            )),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// Maximum pooled database connections (default: `20`).
    pub db_max_connections: u32,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Key for authenticating pagination cursors.
    pub cursor_secret: String,
    /// Page size bounds for list endpoints.
    pub page_limits: PageLimits,
    pub session_backend: SessionBackend,
    /// How often expired session records are purged (default: `60`).
    pub session_sweep_interval_secs: u64,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{name} is invalid: {e}")),
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `HOST`                        | `0.0.0.0`                  |
    /// | `PORT`                        | `3000`                     |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`    |
    /// | `DB_MAX_CONNECTIONS`          | `20`                       |
    /// | `CURSOR_SECRET`               | value of `JWT_SECRET`      |
    /// | `DEFAULT_PAGE_SIZE`           | `20`                       |
    /// | `MAX_PAGE_SIZE`               | `100`                      |
    /// | `SESSION_BACKEND`             | `postgres`                 |
    /// | `SESSION_SWEEP_INTERVAL_SECS` | `60`                       |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on unparsable values, on a CORS origin that is not a valid
    /// header value, or when `DEFAULT_PAGE_SIZE` is outside `1..=MAX_PAGE_SIZE`.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        )
        .unwrap_or_else(|e| panic!("CORS_ORIGINS is invalid: {e}"));
        let db_max_connections: u32 = env_or("DB_MAX_CONNECTIONS", 20);

        let jwt = JwtConfig::from_env();
        let cursor_secret = std::env::var("CURSOR_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| jwt.secret.clone());

        let page_limits = PageLimits {
            default_size: env_or("DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE),
            max_size: env_or("MAX_PAGE_SIZE", MAX_PAGE_SIZE),
        };
        assert!(
            (1..=page_limits.max_size).contains(&page_limits.default_size),
            "DEFAULT_PAGE_SIZE must be between 1 and MAX_PAGE_SIZE"
        );

        let session_backend = env_or("SESSION_BACKEND", SessionBackend::Postgres);
        let session_sweep_interval_secs: u64 = env_or("SESSION_SWEEP_INTERVAL_SECS", 60);

        Self {
            host,
            port,
            cors_origins,
            db_max_connections,
            jwt,
            cursor_secret,
            page_limits,
            session_backend,
            session_sweep_interval_secs,
        }
    }
}

/// Split a comma-separated origin list, skipping empty entries.
fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|o| HeaderValue::from_str(o).map_err(|e| format!("'{o}': {e}")))
        .collect()
}
