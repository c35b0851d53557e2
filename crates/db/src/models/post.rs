//! Post entity model and DTOs.

use agora_core::policy::Owned;
use agora_core::types::{DbId, Timestamp};
use agora_core::validation::{display_text, not_blank};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `posts` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Post {
    pub id: DbId,
    pub board_id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Owned for Post {
    fn owner_id(&self) -> DbId {
        self.owner_id
    }
}

/// DTO for creating a post. The board comes from the URL path.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePost {
    #[validate(
        length(min = 1, max = 200, message = "must be 1 to 200 characters"),
        custom(function = "display_text")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub content: String,
}

/// DTO for updating a post. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePost {
    #[validate(
        length(min = 1, max = 200, message = "must be 1 to 200 characters"),
        custom(function = "display_text")
    )]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub content: Option<String>,
}
