//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT access-token issuing and verification.
//! - [`gate`] -- Token + session check behind every authenticated route.

pub mod gate;
pub mod jwt;
pub mod password;
