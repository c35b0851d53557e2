//! Shared query parameter types for API handlers.

use agora_core::error::CoreError;
use agora_core::pagination::{PageLimits, PageRequest};
use serde::Deserialize;

/// Cursor pagination parameters (`?cursor=&size=&sort=`).
#[derive(Debug, Default, Deserialize)]
pub struct CursorParams {
    pub cursor: Option<String>,
    pub size: Option<i64>,
    pub sort: Option<String>,
}

impl CursorParams {
    /// Validate `size` against the configured limits.
    pub fn page_request(&self, limits: PageLimits) -> Result<PageRequest, CoreError> {
        PageRequest::new(self.cursor.clone(), self.size, limits)
    }
}
