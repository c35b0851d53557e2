//! Domain core for the agora boards service.
//!
//! Pure logic only: no SQL and no HTTP. The database and API crates plug
//! into the ports defined here ([`kv::KeyValueStore`], [`pagination::PageSource`]).

pub mod cursor;
pub mod error;
pub mod kv;
pub mod pagination;
pub mod policy;
pub mod session;
pub mod types;
pub mod validation;
