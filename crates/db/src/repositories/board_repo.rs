//! Repository for the `boards` table, including `posts_count` maintenance.

use agora_core::cursor::{SortKind, SortValue};
use agora_core::pagination::{BoardSort, Keyset, PageSource, Seek};
use agora_core::types::DbId;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use crate::keyset::{KeysetQuery, Scope};
use crate::models::board::{Board, CreateBoard, UpdateBoard};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, public, owner_id, posts_count, created_at, updated_at";

/// Provides CRUD operations for boards.
pub struct BoardRepo;

impl BoardRepo {
    /// Insert a new board owned by `owner_id`, returning the created row.
    ///
    /// A duplicate name violates `uq_boards_name`.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateBoard,
    ) -> Result<Board, sqlx::Error> {
        let query = format!(
            "INSERT INTO boards (name, public, owner_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Board>(&query)
            .bind(&input.name)
            .bind(input.public)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find a board by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Board>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM boards WHERE id = $1");
        sqlx::query_as::<_, Board>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a board by its unique name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Board>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM boards WHERE name = $1");
        sqlx::query_as::<_, Board>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Update a board. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBoard,
    ) -> Result<Option<Board>, sqlx::Error> {
        let query = format!(
            "UPDATE boards SET
                name = COALESCE($2, name),
                public = COALESCE($3, public)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Board>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.public)
            .fetch_optional(pool)
            .await
    }

    /// Delete a board and, by cascade, its posts. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a relative change to `posts_count`, clamped at zero.
    ///
    /// Runs on the caller's connection so it commits or rolls back together
    /// with the post insert/delete that caused it. The single relative UPDATE
    /// takes the row lock, so concurrent adjustments never lose updates.
    pub async fn adjust_posts_count(
        conn: &mut PgConnection,
        board_id: DbId,
        delta: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE boards SET posts_count = GREATEST(posts_count + $2, 0) WHERE id = $1",
        )
        .bind(board_id)
        .bind(delta)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Recompute every board's `posts_count` from live rows.
    ///
    /// Board rows are locked first, so the count is taken only after every
    /// post write already holding a board has committed. Writers arriving
    /// later wait for the lock and apply their delta on top of the new count.
    ///
    /// Returns the number of boards whose stored count was wrong.
    pub async fn resync_posts_count(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM boards ORDER BY id FOR UPDATE")
            .execute(&mut *tx)
            .await?;

        // A fresh statement, so its snapshot sees the writers waited on above.
        let result = sqlx::query(
            "UPDATE boards b
             SET posts_count = live.count
             FROM (
                 SELECT bb.id,
                        (SELECT COUNT(*) FROM posts p WHERE p.board_id = bb.id) AS count
                 FROM boards bb
             ) live
             WHERE b.id = live.id AND b.posts_count <> live.count",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Keyset page source
// ---------------------------------------------------------------------------

/// Boards readable by one user, in one of the [`BoardSort`] orders.
pub struct BoardPageSource<'a> {
    pool: &'a PgPool,
    sort: BoardSort,
    query: KeysetQuery,
}

impl<'a> BoardPageSource<'a> {
    pub fn new(pool: &'a PgPool, requester_id: DbId, sort: BoardSort) -> Self {
        let sort_column = match sort {
            BoardSort::CreatedAt => "created_at",
            BoardSort::UpdatedAt => "updated_at",
            BoardSort::Posts => "posts_count",
            BoardSort::Name => "name",
        };
        Self {
            pool,
            sort,
            query: KeysetQuery {
                table: "boards",
                columns: COLUMNS,
                scope: Scope::AccessibleTo(requester_id),
                sort_column,
                order: sort.order(),
            },
        }
    }
}

#[async_trait]
impl<'a> PageSource for BoardPageSource<'a> {
    type Item = Board;
    type Error = sqlx::Error;

    fn sort_kind(&self) -> SortKind {
        self.sort.kind()
    }

    fn keyset(&self, board: &Board) -> Keyset {
        let value = match self.sort {
            BoardSort::CreatedAt => SortValue::Time(board.created_at),
            BoardSort::UpdatedAt => SortValue::Time(board.updated_at),
            BoardSort::Posts => SortValue::Int(board.posts_count),
            BoardSort::Name => SortValue::Text(board.name.clone()),
        };
        Keyset {
            value,
            id: board.id,
        }
    }

    async fn fetch(&self, seek: &Seek) -> Result<Vec<Board>, sqlx::Error> {
        self.query.fetch(self.pool, seek).await
    }

    async fn count(&self) -> Result<i64, sqlx::Error> {
        self.query.count(self.pool).await
    }
}
