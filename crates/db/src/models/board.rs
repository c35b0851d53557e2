//! Board entity model and DTOs.

use agora_core::policy::{Owned, Visible};
use agora_core::types::{DbId, Timestamp};
use agora_core::validation::display_text;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `boards` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Board {
    pub id: DbId,
    pub name: String,
    pub public: bool,
    pub owner_id: DbId,
    pub posts_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Owned for Board {
    fn owner_id(&self) -> DbId {
        self.owner_id
    }
}

impl Visible for Board {
    fn is_public(&self) -> bool {
        self.public
    }
}

fn default_public() -> bool {
    true
}

/// DTO for creating a board. Boards are public unless stated otherwise.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBoard {
    #[validate(
        length(min = 1, max = 120, message = "must be 1 to 120 characters"),
        custom(function = "display_text")
    )]
    pub name: String,
    #[serde(default = "default_public")]
    pub public: bool,
}

/// DTO for updating a board. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBoard {
    #[validate(
        length(min = 1, max = 120, message = "must be 1 to 120 characters"),
        custom(function = "display_text")
    )]
    pub name: Option<String>,
    pub public: Option<bool>,
}
