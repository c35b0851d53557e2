//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Listings are exposed as
//! keyset page sources driven by `agora_core::pagination::Pager`.

pub mod board_repo;
pub mod post_repo;
pub mod user_repo;

pub use board_repo::{BoardPageSource, BoardRepo};
pub use post_repo::{PostPageSource, PostRepo};
pub use user_repo::UserRepo;
