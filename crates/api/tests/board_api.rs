//! HTTP-level integration tests for the `/boards` resource: CRUD, the
//! visibility policy and cursor pagination.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_board, create_post, delete_auth, get_auth, post_json_auth, put_json_auth,
    register,
};
use serde_json::{json, Value};
use sqlx::PgPool;

/// Walk every page of `uri` forwards and return the board names in order.
async fn collect_names(app: &axum::Router, uri: &str, token: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page_uri = match &cursor {
            Some(c) => format!("{uri}&cursor={c}"),
            None => uri.to_string(),
        };
        let response = get_auth(app.clone(), &page_uri, token).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_json(response).await;
        names.extend(
            page["items"]
                .as_array()
                .unwrap()
                .iter()
                .map(|b| b["name"].as_str().unwrap().to_string()),
        );
        match page["next_cursor"].as_str() {
            Some(next) => cursor = Some(next.to_string()),
            None => return names,
        }
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_board_defaults(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (user_id, token) = register(&app, "owner@example.com").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/boards",
        json!({ "name": "General" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let board = body_json(response).await;
    assert_eq!(board["name"], "General");
    assert_eq!(board["public"], true);
    assert_eq!(board["owner_id"], user_id);
    assert_eq!(board["posts_count"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_board_name_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "owner@example.com").await;
    create_board(&app, &token, "News", true).await;

    let response =
        post_json_auth(app, "/api/v1/boards", json!({ "name": "News" }), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "A board with this name already exists"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_blank_board_name_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "owner@example.com").await;

    let response =
        post_json_auth(app, "/api/v1/boards", json!({ "name": "   " }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_control_characters_in_board_name_are_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "owner@example.com").await;

    let name = "\u{1}".repeat(120);
    let response = post_json_auth(app, "/api/v1/boards", json!({ "name": name }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

/// Cursors minted for the longest, most escape-heavy names still resume.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_name_cursor_for_longest_names_resumes(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "owner@example.com").await;
    let quotes = "\"".repeat(120);
    let backslashes = "\\".repeat(120);
    create_board(&app, &token, &quotes, true).await;
    create_board(&app, &token, &backslashes, true).await;

    let mut names = collect_names(&app, "/api/v1/boards?sort=name&size=1", &token).await;
    names.sort();
    assert_eq!(names, [quotes, backslashes]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_board_is_owner_only(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, owner) = register(&app, "owner@example.com").await;
    let (_, other) = register(&app, "other@example.com").await;
    let board = create_board(&app, &owner, "Lobby", true).await;
    let uri = format!("/api/v1/boards/{}", board["id"]);

    let response =
        put_json_auth(app.clone(), &uri, json!({ "name": "Hijacked" }), &other).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(
        app.clone(),
        &uri,
        json!({ "name": "Main Lobby", "public": false }),
        &owner,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["name"], "Main Lobby");
    assert_eq!(updated["public"], false);
    assert_ne!(updated["updated_at"], board["updated_at"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_rename_to_existing_name_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "owner@example.com").await;
    create_board(&app, &token, "Alpha", true).await;
    let beta = create_board(&app, &token, "Beta", true).await;

    let uri = format!("/api/v1/boards/{}", beta["id"]);
    let response = put_json_auth(app, &uri, json!({ "name": "Alpha" }), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_board_cascades_posts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, owner) = register(&app, "owner@example.com").await;
    let (_, other) = register(&app, "other@example.com").await;
    let board = create_board(&app, &owner, "Doomed", true).await;
    let board_id = board["id"].as_i64().unwrap();
    let post = create_post(&app, &owner, board_id, "Last words").await;
    let board_uri = format!("/api/v1/boards/{board_id}");

    let response = delete_auth(app.clone(), &board_uri, &other).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &board_uri, &owner).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), &board_uri, &owner).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let post_uri = format!("/api/v1/posts/{}", post["id"]);
    let response = get_auth(app, &post_uri, &owner).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_private_board_is_hidden_from_others(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, owner) = register(&app, "owner@example.com").await;
    let (_, other) = register(&app, "other@example.com").await;
    let board = create_board(&app, &owner, "Secret", false).await;
    let uri = format!("/api/v1/boards/{}", board["id"]);

    let response = get_auth(app.clone(), &uri, &other).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");

    let response = get_auth(app.clone(), &uri, &owner).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app, "/api/v1/boards", &other).await;
    let page = body_json(response).await;
    assert_eq!(page["total"], 0);
    assert_eq!(page["items"], json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_board_is_404_not_403(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "owner@example.com").await;

    let response = get_auth(app, "/api/v1/boards/999999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "Board with id 999999 not found"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_shows_public_and_owned_boards(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, alice) = register(&app, "alice@example.com").await;
    let (_, bob) = register(&app, "bob@example.com").await;
    create_board(&app, &alice, "alice-public", true).await;
    create_board(&app, &alice, "alice-private", false).await;
    create_board(&app, &bob, "bob-private", false).await;

    let names = collect_names(&app, "/api/v1/boards?sort=name", &bob).await;
    assert_eq!(names, ["alice-public", "bob-private"]);

    let names = collect_names(&app, "/api/v1/boards?sort=name", &alice).await;
    assert_eq!(names, ["alice-private", "alice-public"]);
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_pages_cover_every_board_once(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "owner@example.com").await;
    for i in 0..7 {
        create_board(&app, &token, &format!("board-{i}"), true).await;
    }

    // Default sort is newest first.
    let names = collect_names(&app, "/api/v1/boards?size=3", &token).await;
    let expected: Vec<String> = (0..7).rev().map(|i| format!("board-{i}")).collect();
    assert_eq!(names, expected);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_page_shape_and_previous_cursor(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "owner@example.com").await;
    for name in ["a", "b", "c", "d", "e"] {
        create_board(&app, &token, name, true).await;
    }

    let first: Value = body_json(get_auth(app.clone(), "/api/v1/boards?sort=name&size=2", &token).await).await;
    assert_eq!(first["total"], 5);
    assert_eq!(first["size"], 2);
    assert_eq!(first["items"][0]["name"], "a");
    assert_eq!(first["items"][1]["name"], "b");
    assert!(first["previous_cursor"].is_null());

    let next = first["next_cursor"].as_str().unwrap();
    let second: Value = body_json(
        get_auth(
            app.clone(),
            &format!("/api/v1/boards?sort=name&size=2&cursor={next}"),
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(second["items"][0]["name"], "c");
    assert_eq!(second["items"][1]["name"], "d");

    let prev = second["previous_cursor"].as_str().unwrap();
    let back: Value = body_json(
        get_auth(
            app,
            &format!("/api/v1/boards?sort=name&size=2&cursor={prev}"),
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(back["items"][0]["name"], "a");
    assert_eq!(back["items"][1]["name"], "b");
    assert!(back["previous_cursor"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_sort_by_posts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "owner@example.com").await;
    let quiet = create_board(&app, &token, "quiet", true).await;
    let busy = create_board(&app, &token, "busy", true).await;
    let quiet_id = quiet["id"].as_i64().unwrap();
    let busy_id = busy["id"].as_i64().unwrap();
    create_post(&app, &token, busy_id, "one").await;
    create_post(&app, &token, busy_id, "two").await;
    create_post(&app, &token, quiet_id, "only").await;

    let page = body_json(get_auth(app, "/api/v1/boards?sort=posts", &token).await).await;
    assert_eq!(page["items"][0]["name"], "busy");
    assert_eq!(page["items"][0]["posts_count"], 2);
    assert_eq!(page["items"][1]["posts_count"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_bad_page_parameters_are_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "owner@example.com").await;

    for uri in [
        "/api/v1/boards?size=0",
        "/api/v1/boards?size=101",
        "/api/v1/boards?sort=popularity",
    ] {
        let response = get_auth(app.clone(), uri, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR", "{uri}");
    }

    let response = get_auth(app, "/api/v1/boards?cursor=forged", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_CURSOR");
}

/// A cursor minted for one sort cannot resume a different one.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_cursor_is_bound_to_its_sort_kind(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token) = register(&app, "owner@example.com").await;
    for name in ["x", "y", "z"] {
        create_board(&app, &token, name, true).await;
    }

    let page = body_json(get_auth(app.clone(), "/api/v1/boards?sort=name&size=1", &token).await).await;
    let cursor = page["next_cursor"].as_str().unwrap();

    let uri = format!("/api/v1/boards?sort=created_at&size=1&cursor={cursor}");
    let response = get_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_CURSOR");
}
