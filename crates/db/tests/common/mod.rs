//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use agora_db::models::board::{Board, CreateBoard};
use agora_db::models::post::{CreatePost, Post};
use agora_db::models::user::{CreateUser, User};
use agora_db::repositories::{BoardRepo, PostRepo, UserRepo};
use sqlx::PgPool;

pub async fn user(pool: &PgPool, email: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            fullname: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn board(pool: &PgPool, owner_id: i64, name: &str, public: bool) -> Board {
    BoardRepo::create(
        pool,
        owner_id,
        &CreateBoard {
            name: name.to_string(),
            public,
        },
    )
    .await
    .unwrap()
}

pub async fn post(pool: &PgPool, board_id: i64, owner_id: i64, title: &str) -> Post {
    PostRepo::create(
        pool,
        board_id,
        owner_id,
        &CreatePost {
            title: title.to_string(),
            content: "body".to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn stored_posts_count(pool: &PgPool, board_id: i64) -> i64 {
    BoardRepo::find_by_id(pool, board_id)
        .await
        .unwrap()
        .unwrap()
        .posts_count
}
