//! Opaque cursor codec.
//!
//! A cursor is the `(created_at, id)` pivot of a keyset page. On the wire it
//! is 24 bytes: the timestamp as a little-endian `f64` of Unix seconds with a
//! fractional part, followed by the 16 raw bytes of the identifier. The bytes
//! are rendered with the URL-safe base64 alphabet without padding so tokens
//! can travel in query strings untouched.

use std::cmp::Ordering;
use std::fmt;

use base64::prelude::*;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PaginationError;

/// Number of bytes in a decoded cursor.
const CURSOR_LEN: usize = 24;

/// Number of bytes holding the timestamp.
const TIMESTAMP_LEN: usize = 8;

/// A position in a result set ordered by `(created_at, id)`.
///
/// Cursors order the same way records do: by timestamp first and by
/// identifier for records sharing a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Cursor {
    /// Creation time of the pivot record.
    pub timestamp: Timestamp,
    /// Identifier of the pivot record (tiebreaker).
    pub id: Uuid,
}

impl Cursor {
    /// Creates a new cursor from a timestamp and ID.
    pub fn new(timestamp: Timestamp, id: Uuid) -> Self {
        Self { timestamp, id }
    }

    /// Encodes the cursor into an opaque token.
    pub fn encode(&self) -> String {
        let mut bytes = [0u8; CURSOR_LEN];
        bytes[..TIMESTAMP_LEN].copy_from_slice(&timestamp_to_secs(self.timestamp).to_le_bytes());
        bytes[TIMESTAMP_LEN..].copy_from_slice(self.id.as_bytes());
        BASE64_URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Decodes an opaque token back into a cursor.
    ///
    /// The timestamp is rounded to the nearest microsecond and is always an
    /// absolute UTC instant.
    pub fn decode(token: &str) -> Result<Self, PaginationError> {
        let bytes = BASE64_URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| PaginationError::InvalidCursor("not valid base64"))?;

        let bytes: [u8; CURSOR_LEN] = bytes
            .try_into()
            .map_err(|_| PaginationError::InvalidCursor("unexpected length"))?;

        let (secs, id) = bytes.split_at(TIMESTAMP_LEN);
        let mut secs_bytes = [0u8; TIMESTAMP_LEN];
        secs_bytes.copy_from_slice(secs);

        let timestamp = secs_to_timestamp(f64::from_le_bytes(secs_bytes))?;
        let id = Uuid::from_slice(id)
            .map_err(|_| PaginationError::InvalidCursor("malformed identifier"))?;

        Ok(Self { timestamp, id })
    }
}

fn timestamp_to_secs(timestamp: Timestamp) -> f64 {
    timestamp.as_second() as f64 + f64::from(timestamp.subsec_nanosecond()) / 1e9
}

fn secs_to_timestamp(secs: f64) -> Result<Timestamp, PaginationError> {
    if !secs.is_finite() {
        return Err(PaginationError::InvalidCursor("timestamp is not finite"));
    }

    let micros = (secs * 1e6).round();
    if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
        return Err(PaginationError::InvalidCursor("timestamp out of range"));
    }

    Timestamp::from_microsecond(micros as i64)
        .map_err(|_| PaginationError::InvalidCursor("timestamp out of range"))
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.encode()
    }
}

impl TryFrom<String> for Cursor {
    type Error = PaginationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Cursor::decode(&value)
    }
}

impl std::str::FromStr for Cursor {
    type Err = PaginationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cursor::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn micros(value: i64) -> Timestamp {
        Timestamp::from_microsecond(value).unwrap()
    }

    #[test]
    fn cursor_encode_decode_roundtrip() {
        let timestamp = micros(1_718_000_000_123_456);
        let cursor = Cursor::new(timestamp, Uuid::new_v4());

        let encoded = cursor.encode();
        assert_eq!(encoded.len(), 32);

        let decoded = Cursor::decode(&encoded).unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn cursor_roundtrip_keeps_millisecond_fidelity_for_nanos() {
        let timestamp = Timestamp::new(1_718_000_000, 987_654_321).unwrap();
        let cursor = Cursor::new(timestamp, Uuid::new_v4());

        let decoded = Cursor::decode(&cursor.encode()).unwrap();
        let drift = (decoded.timestamp.as_nanosecond() - timestamp.as_nanosecond()).abs();
        assert!(drift < 1_000, "drift of {drift}ns");
        assert_eq!(decoded.id, cursor.id);
    }

    #[test]
    fn cursor_roundtrip_before_epoch() {
        let cursor = Cursor::new(micros(-1_500_000), Uuid::nil());
        assert_eq!(Cursor::decode(&cursor.encode()).unwrap(), cursor);
    }

    #[test]
    fn cursor_layout_is_little_endian_seconds_then_uuid() {
        let id = Uuid::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff);
        let cursor = Cursor::new(micros(1_500_000), id);

        let bytes = BASE64_URL_SAFE_NO_PAD.decode(cursor.encode()).unwrap();
        assert_eq!(&bytes[..8], &1.5f64.to_le_bytes());
        assert_eq!(&bytes[8..], id.as_bytes());
    }

    #[test]
    fn cursor_decode_rejects_non_base64() {
        let error = Cursor::decode("not a cursor!").unwrap_err();
        assert!(error.is_invalid_cursor());
    }

    #[test]
    fn cursor_decode_rejects_surrounding_whitespace() {
        let token = Cursor::new(micros(1_000_000), Uuid::from_u128(7)).encode();
        assert!(Cursor::decode(&token).is_ok());

        for padded in [format!(" {token}"), format!("{token}\n"), format!("\t{token} ")] {
            assert!(Cursor::decode(&padded).unwrap_err().is_invalid_cursor());
        }
    }

    #[test]
    fn cursor_decode_rejects_short_payload() {
        let token = BASE64_URL_SAFE_NO_PAD.encode([0u8; 23]);
        assert!(Cursor::decode(&token).unwrap_err().is_invalid_cursor());
        assert!(Cursor::decode("").unwrap_err().is_invalid_cursor());
    }

    #[test]
    fn cursor_decode_rejects_long_payload() {
        let token = BASE64_URL_SAFE_NO_PAD.encode([0u8; 25]);
        assert!(Cursor::decode(&token).unwrap_err().is_invalid_cursor());
    }

    #[test]
    fn cursor_decode_never_panics_on_extreme_payloads() {
        for secs in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, f64::MAX, -1e300] {
            let mut bytes = [0u8; 24];
            bytes[..8].copy_from_slice(&secs.to_le_bytes());
            let token = BASE64_URL_SAFE_NO_PAD.encode(bytes);
            assert!(Cursor::decode(&token).unwrap_err().is_invalid_cursor());
        }
    }

    #[test]
    fn cursor_ordering_breaks_ties_by_id() {
        let timestamp = micros(42);
        let low = Cursor::new(timestamp, Uuid::from_u128(1));
        let high = Cursor::new(timestamp, Uuid::from_u128(2));
        let later = Cursor::new(micros(43), Uuid::from_u128(0));

        assert!(low < high);
        assert!(high < later);
    }

    #[test]
    fn cursor_serde_uses_token() {
        let cursor = Cursor::new(micros(1_000_000), Uuid::from_u128(7));
        let json = serde_json::to_string(&cursor).unwrap();
        assert_eq!(json, format!("\"{}\"", cursor.encode()));

        let back: Cursor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cursor);
        assert!(serde_json::from_str::<Cursor>("\"garbage\"").is_err());
    }
}
