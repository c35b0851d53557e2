//! Liveness report for load balancers, mounted at the root.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Key read to check that the session store answers. It is never written.
const SESSION_STORE_CHECK_KEY: &str = "health:session-store";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency answered, otherwise `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether a session lookup can currently succeed.
    pub session_store_healthy: bool,
}

/// GET /health
///
/// Answers 503 when either store is down so the instance is taken out of
/// rotation; login and every authenticated route would fail anyway.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = agora_db::health_check(&state.pool).await.is_ok();
    let session_store_healthy = match state.kv.get(SESSION_STORE_CHECK_KEY).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Session store health check failed");
            false
        }
    };

    let healthy = db_healthy && session_store_healthy;
    let (code, status) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            session_store_healthy,
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
