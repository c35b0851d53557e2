use crate::cursor::CursorError;
use crate::types::DbId;

/// Domain error taxonomy shared by every layer.
///
/// Each variant maps to exactly one HTTP status class at the API boundary;
/// the core itself carries no transport concerns.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid cursor")]
    InvalidCursor,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CursorError> for CoreError {
    fn from(_: CursorError) -> Self {
        CoreError::InvalidCursor
    }
}
