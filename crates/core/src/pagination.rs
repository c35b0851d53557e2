//! Keyset (cursor) pagination.
//!
//! The [`Pager`] drives any [`PageSource`]: it decodes the incoming cursor,
//! asks the source for `size + 1` rows strictly beyond the cursor's
//! `(sort_value, id)` position, uses the extra row to detect a further page,
//! and mints next/previous cursors from the boundary rows. The id tie-break is
//! mandatory, so rows sharing a sort value are totally ordered and never
//! skipped or repeated across pages.

use async_trait::async_trait;
use serde::Serialize;

use crate::cursor::{Cursor, CursorCodec, CursorError, Direction, SortKind, SortValue};
use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default page size when the client omits `size`.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

// ---------------------------------------------------------------------------
// Sort options
// ---------------------------------------------------------------------------

/// Direction of the sort column (the id tie-break always follows it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Sort options for board listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardSort {
    #[default]
    CreatedAt,
    UpdatedAt,
    Posts,
    Name,
}

impl BoardSort {
    pub const ALL: [BoardSort; 4] = [
        BoardSort::CreatedAt,
        BoardSort::UpdatedAt,
        BoardSort::Posts,
        BoardSort::Name,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BoardSort::CreatedAt => "created_at",
            BoardSort::UpdatedAt => "updated_at",
            BoardSort::Posts => "posts",
            BoardSort::Name => "name",
        }
    }

    /// Parse the `sort` query parameter; `None` selects the default.
    pub fn parse(raw: Option<&str>) -> Result<Self, CoreError> {
        match raw {
            None => Ok(Self::default()),
            Some(s) => Self::ALL
                .into_iter()
                .find(|opt| opt.as_str() == s)
                .ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Unknown sort '{s}'. Expected one of: created_at, updated_at, posts, name"
                    ))
                }),
        }
    }

    pub fn kind(self) -> SortKind {
        match self {
            BoardSort::CreatedAt | BoardSort::UpdatedAt => SortKind::Time,
            BoardSort::Posts => SortKind::Int,
            BoardSort::Name => SortKind::Text,
        }
    }

    /// Newest / busiest first; names alphabetically. Name sorting keeps the id
    /// tie-break ascending too so one row-wise comparison covers both columns.
    pub fn order(self) -> SortOrder {
        match self {
            BoardSort::Name => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// Sort options for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    #[default]
    CreatedAt,
}

impl PostSort {
    pub fn as_str(self) -> &'static str {
        match self {
            PostSort::CreatedAt => "created_at",
        }
    }

    pub fn parse(raw: Option<&str>) -> Result<Self, CoreError> {
        match raw {
            None | Some("created_at") => Ok(PostSort::CreatedAt),
            Some(s) => Err(CoreError::Validation(format!(
                "Unknown sort '{s}'. Expected one of: created_at"
            ))),
        }
    }

    pub fn kind(self) -> SortKind {
        SortKind::Time
    }

    pub fn order(self) -> SortOrder {
        SortOrder::Desc
    }
}

// ---------------------------------------------------------------------------
// Requests and results
// ---------------------------------------------------------------------------

/// Position of a row in a keyset order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyset {
    pub value: SortValue,
    pub id: DbId,
}

/// What a [`PageSource`] is asked to fetch.
///
/// Rows must come back in traversal order: for [`Direction::Next`] that is the
/// listing order, for [`Direction::Prev`] it is the reverse (nearest row to
/// `after` first).
#[derive(Debug, Clone)]
pub struct Seek {
    /// Exclusive bound. `None` starts from the beginning of the order.
    pub after: Option<Keyset>,
    pub direction: Direction,
    pub limit: i64,
}

/// Validated page request: a raw cursor (absent = first page) and a size.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub size: i64,
}

/// Page size bounds, normally loaded from configuration.
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_size: i64,
    pub max_size: i64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request from raw query parameters.
    ///
    /// `size` must lie in `[1, limits.max_size]`; an empty `cursor` string is
    /// treated as absent.
    pub fn new(
        cursor: Option<String>,
        size: Option<i64>,
        limits: PageLimits,
    ) -> Result<Self, CoreError> {
        let size = size.unwrap_or(limits.default_size);
        if size < 1 || size > limits.max_size {
            return Err(CoreError::Validation(format!(
                "size must be between 1 and {}",
                limits.max_size
            )));
        }
        Ok(Self {
            cursor: cursor.filter(|c| !c.is_empty()),
            size,
        })
    }
}

/// One page of results plus the cursors to continue traversal.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub size: i64,
    pub next_cursor: Option<String>,
    pub previous_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Convert the items while keeping the cursors and totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            size: self.size,
            next_cursor: self.next_cursor,
            previous_cursor: self.previous_cursor,
        }
    }
}

/// Failure of [`Pager::paginate`].
#[derive(Debug, thiserror::Error)]
pub enum PageError<E> {
    #[error("invalid cursor")]
    InvalidCursor,
    #[error(transparent)]
    Source(E),
}

impl<E> From<CursorError> for PageError<E> {
    fn from(_: CursorError) -> Self {
        PageError::InvalidCursor
    }
}

// ---------------------------------------------------------------------------
// Source port
// ---------------------------------------------------------------------------

/// An ordered, filtered result set that can be read in keyset windows.
///
/// The implementor owns the base query (filter + `(sort, id)` order); the
/// [`Pager`] only supplies the cursor bound and the window size.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;
    type Error: Send;

    /// Type of the sort column, used to reject cursors from another sort.
    fn sort_kind(&self) -> SortKind;

    /// Keyset position of a row.
    fn keyset(&self, item: &Self::Item) -> Keyset;

    /// Rows strictly beyond `seek.after` in `seek.direction`, at most `seek.limit`.
    async fn fetch(&self, seek: &Seek) -> Result<Vec<Self::Item>, Self::Error>;

    /// Size of the full accessible set, ignoring any cursor bound.
    async fn count(&self) -> Result<i64, Self::Error>;
}

// ---------------------------------------------------------------------------
// Pager
// ---------------------------------------------------------------------------

/// Cursor pager, independent of the entity being paginated.
#[derive(Debug, Clone)]
pub struct Pager {
    codec: CursorCodec,
}

impl Pager {
    pub fn new(codec: CursorCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &CursorCodec {
        &self.codec
    }

    /// Read one page from `source`.
    pub async fn paginate<S: PageSource>(
        &self,
        source: &S,
        request: &PageRequest,
    ) -> Result<Page<S::Item>, PageError<S::Error>> {
        let cursor = match request.cursor.as_deref() {
            Some(raw) => Some(self.codec.decode(raw)?),
            None => None,
        };

        if let Some(c) = &cursor {
            if c.sort_value.kind() != source.sort_kind() {
                tracing::debug!("Rejected cursor minted for a different sort");
                return Err(PageError::InvalidCursor);
            }
        }

        let direction = cursor
            .as_ref()
            .map_or(Direction::Next, |c| c.direction);
        let resumed = cursor.is_some();
        let seek = Seek {
            after: cursor.map(|c| Keyset {
                value: c.sort_value,
                id: c.tie_id,
            }),
            direction,
            limit: request.size + 1,
        };

        let mut items = source.fetch(&seek).await.map_err(PageError::Source)?;
        let has_more = items.len() as i64 > request.size;
        items.truncate(request.size as usize);
        if direction == Direction::Prev {
            items.reverse();
        }

        let total = source.count().await.map_err(PageError::Source)?;

        let first = items.first().map(|item| source.keyset(item));
        let last = items.last().map(|item| source.keyset(item));

        let (next_cursor, previous_cursor) = match direction {
            Direction::Next => (
                last.filter(|_| has_more)
                    .map(|k| self.mint(k, Direction::Next)),
                first
                    .filter(|_| resumed)
                    .map(|k| self.mint(k, Direction::Prev)),
            ),
            Direction::Prev => (
                last.map(|k| self.mint(k, Direction::Next)),
                first
                    .filter(|_| has_more)
                    .map(|k| self.mint(k, Direction::Prev)),
            ),
        };

        Ok(Page {
            items,
            total,
            size: request.size,
            next_cursor,
            previous_cursor,
        })
    }

    fn mint(&self, keyset: Keyset, direction: Direction) -> String {
        self.codec
            .encode(&Cursor::new(keyset.value, keyset.id, direction))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
