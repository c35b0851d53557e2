//! Keyset (seek-method) query construction shared by the page sources.
//!
//! Every listing is a single table filtered by a [`Scope`] and ordered by
//! `(sort_column, id)` in one uniform direction, so the cursor bound is a
//! single row-wise comparison that the composite indexes can serve.

use agora_core::cursor::{Direction, SortValue};
use agora_core::pagination::{Seek, SortOrder};
use agora_core::types::DbId;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

/// Row filter applied to both the window and the total count. Always binds `$1`.
#[derive(Debug, Clone, Copy)]
pub enum Scope {
    /// Posts of one board.
    Board(DbId),
    /// Boards readable by a user: public ones plus the user's own.
    AccessibleTo(DbId),
}

impl Scope {
    fn clause(self) -> &'static str {
        match self {
            Scope::Board(_) => "board_id = $1",
            Scope::AccessibleTo(_) => "(public OR owner_id = $1)",
        }
    }

    fn id(self) -> DbId {
        match self {
            Scope::Board(id) | Scope::AccessibleTo(id) => id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeysetQuery {
    pub table: &'static str,
    pub columns: &'static str,
    pub scope: Scope,
    pub sort_column: &'static str,
    pub order: SortOrder,
}

impl KeysetQuery {
    /// Comparison operator and ORDER BY direction for a traversal.
    ///
    /// `Next` walks the listing order; `Prev` walks it backwards so the rows
    /// nearest the cursor come first.
    fn plan(&self, direction: Direction) -> (&'static str, &'static str) {
        match (self.order, direction) {
            (SortOrder::Desc, Direction::Next) | (SortOrder::Asc, Direction::Prev) => ("<", "DESC"),
            (SortOrder::Asc, Direction::Next) | (SortOrder::Desc, Direction::Prev) => (">", "ASC"),
        }
    }

    /// Fetch at most `seek.limit` rows strictly beyond `seek.after`.
    pub async fn fetch<T>(&self, pool: &PgPool, seek: &Seek) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let (cmp, dir) = self.plan(seek.direction);
        let sort = self.sort_column;

        let mut bind_idx = 2u32;
        let bound = if seek.after.is_some() {
            let clause = format!(
                "AND ({sort}, id) {cmp} (${bind_idx}, ${next_idx})",
                next_idx = bind_idx + 1
            );
            bind_idx += 2;
            clause
        } else {
            String::new()
        };

        let query = format!(
            "SELECT {columns} FROM {table} \
             WHERE {scope} {bound} \
             ORDER BY {sort} {dir}, id {dir} \
             LIMIT ${bind_idx}",
            columns = self.columns,
            table = self.table,
            scope = self.scope.clause(),
        );

        let mut q = sqlx::query_as::<_, T>(&query).bind(self.scope.id());
        if let Some(after) = &seek.after {
            q = match &after.value {
                SortValue::Time(t) => q.bind(*t),
                SortValue::Int(n) => q.bind(*n),
                SortValue::Text(s) => q.bind(s.as_str()),
            };
            q = q.bind(after.id);
        }
        q.bind(seek.limit).fetch_all(pool).await
    }

    /// Size of the scoped set, ignoring any cursor.
    pub async fn count(&self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM {table} WHERE {scope}",
            table = self.table,
            scope = self.scope.clause(),
        );
        let (total,): (i64,) = sqlx::query_as(&query)
            .bind(self.scope.id())
            .fetch_one(pool)
            .await?;
        Ok(total)
    }
}
