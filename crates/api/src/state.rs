use std::sync::Arc;
use std::time::Duration;

use agora_core::cursor::CursorCodec;
use agora_core::kv::{KeyValueStore, MemoryKeyValueStore};
use agora_core::pagination::Pager;
use agora_core::session::SessionStore;
use agora_db::kv_store::PgKeyValueStore;

use crate::auth::gate::AuthGate;
use crate::config::{ServerConfig, SessionBackend};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: agora_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Key-value backend holding session records.
    pub kv: Arc<dyn KeyValueStore>,
    pub sessions: SessionStore,
    /// Token + session check used by the `AuthUser` extractor.
    pub gate: AuthGate,
    /// Cursor pager for every list endpoint.
    pub pager: Pager,
}

impl AppState {
    /// Wire collaborators from configuration.
    pub fn new(pool: agora_db::DbPool, config: ServerConfig) -> Self {
        let kv: Arc<dyn KeyValueStore> = match config.session_backend {
            SessionBackend::Postgres => Arc::new(PgKeyValueStore::new(pool.clone())),
            SessionBackend::Memory => Arc::new(MemoryKeyValueStore::new()),
        };
        Self::with_kv(pool, config, kv)
    }

    /// Like [`AppState::new`] with an explicit key-value backend.
    pub fn with_kv(
        pool: agora_db::DbPool,
        config: ServerConfig,
        kv: Arc<dyn KeyValueStore>,
    ) -> Self {
        // Sessions live exactly as long as the access token they carry.
        let session_ttl = Duration::from_secs(config.jwt.access_ttl_secs().unsigned_abs());
        let sessions = SessionStore::new(Arc::clone(&kv), session_ttl);
        let gate = AuthGate::new(Arc::new(config.jwt.clone()), sessions.clone());
        let pager = Pager::new(CursorCodec::new(&config.cursor_secret));

        Self {
            pool,
            config: Arc::new(config),
            kv,
            sessions,
            gate,
            pager,
        }
    }
}
