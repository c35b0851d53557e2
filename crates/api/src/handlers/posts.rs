//! Handlers for posts: `/boards/{board_id}/posts` and `/posts/{id}`.
//!
//! Reads are gated by the parent board's visibility; writes by the post's
//! own owner.

use agora_core::error::CoreError;
use agora_core::pagination::{Page, PostSort};
use agora_core::policy::{ensure_access, ensure_mutate};
use agora_core::types::DbId;
use agora_core::validation::validate_input;
use agora_db::models::post::{CreatePost, Post, UpdatePost};
use agora_db::repositories::{PostPageSource, PostRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::handlers::boards::load_board;
use crate::middleware::auth::AuthUser;
use crate::query::CursorParams;
use crate::state::AppState;

async fn load_post(state: &AppState, id: DbId) -> AppResult<Post> {
    PostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Post", id }))
}

/// POST /api/v1/boards/{board_id}/posts
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(board_id): Path<DbId>,
    Json(input): Json<CreatePost>,
) -> AppResult<(StatusCode, Json<Post>)> {
    validate_input(&input)?;
    let board = load_board(&state, board_id).await?;
    ensure_access(&board, auth_user.user_id, "board")?;

    let post = PostRepo::create(&state.pool, board.id, auth_user.user_id, &input).await?;
    tracing::info!(post_id = post.id, board_id, user_id = auth_user.user_id, "Post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/v1/boards/{board_id}/posts
pub async fn list_for_board(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(board_id): Path<DbId>,
    Query(params): Query<CursorParams>,
) -> AppResult<Json<Page<Post>>> {
    let board = load_board(&state, board_id).await?;
    ensure_access(&board, auth_user.user_id, "board")?;

    let sort = PostSort::parse(params.sort.as_deref())?;
    let request = params.page_request(state.config.page_limits)?;

    let source = PostPageSource::new(&state.pool, board.id, sort);
    let page = state.pager.paginate(&source, &request).await?;
    Ok(Json(page))
}

/// GET /api/v1/posts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Post>> {
    let post = load_post(&state, id).await?;
    let board = load_board(&state, post.board_id).await?;
    ensure_access(&board, auth_user.user_id, "post")?;
    Ok(Json(post))
}

/// PUT /api/v1/posts/{id}
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePost>,
) -> AppResult<Json<Post>> {
    validate_input(&input)?;
    let post = load_post(&state, id).await?;
    ensure_mutate(&post, auth_user.user_id, "post")?;

    let post = PostRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Post", id }))?;
    Ok(Json(post))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let post = load_post(&state, id).await?;
    ensure_mutate(&post, auth_user.user_id, "post")?;

    if PostRepo::delete(&state.pool, id).await? {
        tracing::info!(post_id = id, board_id = post.board_id, "Post deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Post", id }))
    }
}
