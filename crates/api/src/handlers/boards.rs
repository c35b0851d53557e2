//! Handlers for the `/boards` resource.

use agora_core::error::CoreError;
use agora_core::pagination::{BoardSort, Page};
use agora_core::policy::{ensure_access, ensure_mutate};
use agora_core::types::DbId;
use agora_core::validation::validate_input;
use agora_db::models::board::{Board, CreateBoard, UpdateBoard};
use agora_db::repositories::{BoardPageSource, BoardRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::CursorParams;
use crate::state::AppState;

/// Load a board or fail with 404.
pub(crate) async fn load_board(state: &AppState, id: DbId) -> AppResult<Board> {
    BoardRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Board", id }))
}

/// POST /api/v1/boards
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateBoard>,
) -> AppResult<(StatusCode, Json<Board>)> {
    validate_input(&input)?;
    let board = BoardRepo::create(&state.pool, auth_user.user_id, &input).await?;
    tracing::info!(board_id = board.id, user_id = auth_user.user_id, "Board created");
    Ok((StatusCode::CREATED, Json(board)))
}

/// GET /api/v1/boards
///
/// Boards the caller can read (public or owned), one cursor page at a time.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<CursorParams>,
) -> AppResult<Json<Page<Board>>> {
    let sort = BoardSort::parse(params.sort.as_deref())?;
    let request = params.page_request(state.config.page_limits)?;

    let source = BoardPageSource::new(&state.pool, auth_user.user_id, sort);
    let page = state.pager.paginate(&source, &request).await?;
    Ok(Json(page))
}

/// GET /api/v1/boards/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Board>> {
    let board = load_board(&state, id).await?;
    ensure_access(&board, auth_user.user_id, "board")?;
    Ok(Json(board))
}

/// PUT /api/v1/boards/{id}
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBoard>,
) -> AppResult<Json<Board>> {
    validate_input(&input)?;
    let board = load_board(&state, id).await?;
    ensure_mutate(&board, auth_user.user_id, "board")?;

    let board = BoardRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Board", id }))?;
    tracing::info!(board_id = id, user_id = auth_user.user_id, "Board updated");
    Ok(Json(board))
}

/// DELETE /api/v1/boards/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let board = load_board(&state, id).await?;
    ensure_mutate(&board, auth_user.user_id, "board")?;

    if BoardRepo::delete(&state.pool, id).await? {
        tracing::info!(board_id = id, user_id = auth_user.user_id, "Board deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Board", id }))
    }
}
