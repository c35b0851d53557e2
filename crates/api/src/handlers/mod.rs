//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the repositories in `agora_db`, apply the ownership
//! policy from `agora_core`, and map errors via [`crate::error::AppError`].

pub mod auth;
pub mod boards;
pub mod posts;
