//! Opaque pagination cursors.
//!
//! A cursor names a position in a keyset-ordered result set as the tuple
//! `(sort_value, tie_break_id, direction)`. On the wire it is the compact JSON
//! array `[sort_value, id, direction]` followed by an HMAC-SHA256 tag over those
//! bytes, the whole thing base64url-encoded without padding.
//!
//! Decoding fails closed: bad base64, a short buffer, a tag mismatch, a wrong
//! field count, or a type mismatch all collapse into the single
//! [`CursorError`]. Callers can never observe *which* check failed.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::types::{DbId, Timestamp};

type HmacSha256 = Hmac<Sha256>;

/// Length of the HMAC-SHA256 tag appended to every payload.
const TAG_LEN: usize = 32;

/// Longest text sort value a cursor must carry (board names).
pub const MAX_TEXT_SORT_CHARS: usize = 120;

/// Worst-case JSON size of one character: a control character is escaped as
/// `\u00XX`.
const MAX_JSON_BYTES_PER_CHAR: usize = 6;

/// Everything in the payload besides the text itself: brackets, the variant
/// tag, quotes, separators, an `i64` id with sign and the direction.
const PAYLOAD_FRAME_LEN: usize = 64;

const fn base64_len(bytes: usize) -> usize {
    (bytes * 4).div_ceil(3)
}

/// Upper bound on the encoded cursor length accepted by [`CursorCodec::decode`].
///
/// Derived from the longest payload [`CursorCodec::encode`] can produce for a
/// text sort value of [`MAX_TEXT_SORT_CHARS`] characters.
pub const MAX_CURSOR_LEN: usize = base64_len(
    MAX_TEXT_SORT_CHARS * MAX_JSON_BYTES_PER_CHAR + PAYLOAD_FRAME_LEN + TAG_LEN,
);

// ---------------------------------------------------------------------------
// Cursor values
// ---------------------------------------------------------------------------

/// Value of the active sort column at a page boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortValue {
    #[serde(rename = "t")]
    Time(Timestamp),
    #[serde(rename = "i")]
    Int(i64),
    #[serde(rename = "s")]
    Text(String),
}

/// The type of a sort column, used to reject cursors minted for another sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKind {
    Time,
    Int,
    Text,
}

impl SortValue {
    pub fn kind(&self) -> SortKind {
        match self {
            SortValue::Time(_) => SortKind::Time,
            SortValue::Int(_) => SortKind::Int,
            SortValue::Text(_) => SortKind::Text,
        }
    }
}

/// Traversal direction encoded in a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Towards rows later in the sort order (the "next" page).
    #[serde(rename = "n")]
    Next,
    /// Towards rows earlier in the sort order (the "previous" page).
    #[serde(rename = "p")]
    Prev,
}

/// A decoded cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub sort_value: SortValue,
    pub tie_id: DbId,
    pub direction: Direction,
}

impl Cursor {
    pub fn new(sort_value: SortValue, tie_id: DbId, direction: Direction) -> Self {
        Self {
            sort_value,
            tie_id,
            direction,
        }
    }
}

/// Wire layout: a three-element JSON array.
#[derive(Serialize, Deserialize)]
struct WireCursor(SortValue, DbId, Direction);

/// The single failure outcome of cursor decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid cursor")]
pub struct CursorError;

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Keyed encoder/decoder for [`Cursor`] values.
///
/// Pure and side-effect free; the key only authenticates, it does not hide the
/// payload.
#[derive(Clone)]
pub struct CursorCodec {
    key: Vec<u8>,
}

impl std::fmt::Debug for CursorCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorCodec").finish_non_exhaustive()
    }
}

impl CursorCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length")
    }

    /// Encode a cursor into a URL-safe string.
    pub fn encode(&self, cursor: &Cursor) -> String {
        let wire = WireCursor(cursor.sort_value.clone(), cursor.tie_id, cursor.direction);
        let mut bytes = serde_json::to_vec(&wire).expect("cursor payload is plain JSON data");

        let mut mac = self.mac();
        mac.update(&bytes);
        bytes.extend_from_slice(&mac.finalize().into_bytes());

        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Decode a string produced by [`CursorCodec::encode`].
    pub fn decode(&self, raw: &str) -> Result<Cursor, CursorError> {
        if raw.is_empty() || raw.len() > MAX_CURSOR_LEN {
            return Err(CursorError);
        }

        let bytes = URL_SAFE_NO_PAD.decode(raw).map_err(|e| {
            tracing::debug!(error = %e, "Rejected cursor: not base64url");
            CursorError
        })?;

        if bytes.len() <= TAG_LEN {
            tracing::debug!(len = bytes.len(), "Rejected cursor: too short");
            return Err(CursorError);
        }
        let (payload, tag) = bytes.split_at(bytes.len() - TAG_LEN);

        let mut mac = self.mac();
        mac.update(payload);
        mac.verify_slice(tag).map_err(|_| {
            tracing::debug!("Rejected cursor: tag mismatch");
            CursorError
        })?;

        let WireCursor(sort_value, tie_id, direction) = serde_json::from_slice(payload)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected cursor: malformed payload");
                CursorError
            })?;

        Ok(Cursor {
            sort_value,
            tie_id,
            direction,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
