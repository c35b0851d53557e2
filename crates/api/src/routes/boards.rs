//! Route definitions for the `/boards` resource, including nested posts.

use axum::routing::get;
use axum::Router;

use crate::handlers::{boards, posts};
use crate::state::AppState;

/// Routes mounted at `/boards`.
///
/// ```text
/// GET    /                    -> list
/// POST   /                    -> create
/// GET    /{id}                -> get_by_id
/// PUT    /{id}                -> update
/// DELETE /{id}                -> delete
/// GET    /{board_id}/posts    -> posts::list_for_board
/// POST   /{board_id}/posts    -> posts::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(boards::list).post(boards::create))
        .route(
            "/{id}",
            get(boards::get_by_id)
                .put(boards::update)
                .delete(boards::delete),
        )
        .route(
            "/{board_id}/posts",
            get(posts::list_for_board).post(posts::create),
        )
}
