//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the bearer token and session to a user.

pub mod auth;
