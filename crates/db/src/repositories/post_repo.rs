//! Repository for the `posts` table.
//!
//! Inserts and deletes adjust the parent board's `posts_count` inside the same
//! transaction.

use agora_core::cursor::{SortKind, SortValue};
use agora_core::pagination::{Keyset, PageSource, PostSort, Seek};
use agora_core::types::DbId;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::keyset::{KeysetQuery, Scope};
use crate::models::post::{CreatePost, Post, UpdatePost};
use crate::repositories::BoardRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, board_id, owner_id, title, content, created_at, updated_at";

/// Provides CRUD operations for posts.
pub struct PostRepo;

impl PostRepo {
    /// Insert a post and increment the board's counter atomically.
    pub async fn create(
        pool: &PgPool,
        board_id: DbId,
        owner_id: DbId,
        input: &CreatePost,
    ) -> Result<Post, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO posts (board_id, owner_id, title, content)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let post = sqlx::query_as::<_, Post>(&query)
            .bind(board_id)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_one(&mut *tx)
            .await?;

        BoardRepo::adjust_posts_count(&mut tx, board_id, 1).await?;

        tx.commit().await?;
        Ok(post)
    }

    /// Find a post by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a post. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePost,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET
                title = COALESCE($2, title),
                content = COALESCE($3, content)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_optional(pool)
            .await
    }

    /// Delete a post and decrement the board's counter atomically.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted: Option<(DbId,)> =
            sqlx::query_as("DELETE FROM posts WHERE id = $1 RETURNING board_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((board_id,)) = deleted else {
            return Ok(false);
        };
        BoardRepo::adjust_posts_count(&mut tx, board_id, -1).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Count live posts of a board.
    pub async fn count_for_board(pool: &PgPool, board_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE board_id = $1")
            .bind(board_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Keyset page source
// ---------------------------------------------------------------------------

/// Posts of one board, newest first.
pub struct PostPageSource<'a> {
    pool: &'a PgPool,
    sort: PostSort,
    query: KeysetQuery,
}

impl<'a> PostPageSource<'a> {
    pub fn new(pool: &'a PgPool, board_id: DbId, sort: PostSort) -> Self {
        Self {
            pool,
            sort,
            query: KeysetQuery {
                table: "posts",
                columns: COLUMNS,
                scope: Scope::Board(board_id),
                sort_column: sort.as_str(),
                order: sort.order(),
            },
        }
    }
}

#[async_trait]
impl<'a> PageSource for PostPageSource<'a> {
    type Item = Post;
    type Error = sqlx::Error;

    fn sort_kind(&self) -> SortKind {
        self.sort.kind()
    }

    fn keyset(&self, post: &Post) -> Keyset {
        let value = match self.sort {
            PostSort::CreatedAt => SortValue::Time(post.created_at),
        };
        Keyset { value, id: post.id }
    }

    async fn fetch(&self, seek: &Seek) -> Result<Vec<Post>, sqlx::Error> {
        self.query.fetch(self.pool, seek).await
    }

    async fn count(&self) -> Result<i64, sqlx::Error> {
        self.query.count(self.pool).await
    }
}
