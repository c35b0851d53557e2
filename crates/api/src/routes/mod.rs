pub mod auth;
pub mod boards;
pub mod health;
pub mod posts;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                      create account (public)
/// /auth/login                       login (public)
/// /auth/logout                      logout (requires auth)
/// /auth/session/refresh             extend session (requires auth)
/// /auth/me                          current identity (requires auth)
///
/// /boards                           list, create
/// /boards/{id}                      get, update, delete
/// /boards/{board_id}/posts          list, create
///
/// /posts/{id}                       get, update, delete
/// ```
///
/// Everything outside `/auth/signup` and `/auth/login` requires a bearer
/// token backed by a live session.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/boards", boards::router())
        .nest("/posts", posts::router())
}
