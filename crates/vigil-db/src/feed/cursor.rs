//! Opaque feed cursors.
//!
//! A cursor is URL-safe base64 (no padding) of `"{timestamp_ms}_{entry_id}"`:
//! the position of the last entry a poller has seen. Anyone holding the
//! position can rebuild the cursor, so cursors are never stored.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};

/// A decoded feed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub timestamp_ms: i64,
    pub entry_id: i64,
}

/// Why a cursor was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    Malformed(String),
    Expired { age_days: i64 },
}

impl Cursor {
    #[must_use]
    pub const fn new(timestamp_ms: i64, entry_id: i64) -> Self {
        Self {
            timestamp_ms,
            entry_id,
        }
    }

    #[must_use]
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}_{}", self.timestamp_ms, self.entry_id))
    }

    /// Parse a cursor without checking its age.
    ///
    /// # Errors
    ///
    /// Returns `CursorError::Malformed` for anything that is not a valid
    /// encoding of two non-negative integers.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| CursorError::Malformed(format!("not base64: {e}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| CursorError::Malformed("not utf-8".into()))?;
        let (ts, seq) = text
            .split_once('_')
            .ok_or_else(|| CursorError::Malformed("missing separator".into()))?;

        let timestamp_ms: i64 = ts
            .parse()
            .map_err(|_| CursorError::Malformed(format!("bad timestamp '{ts}'")))?;
        let entry_id: i64 = seq
            .parse()
            .map_err(|_| CursorError::Malformed(format!("bad sequence '{seq}'")))?;
        if timestamp_ms < 0 || entry_id < 0 {
            return Err(CursorError::Malformed("negative position".into()));
        }
        Ok(Self::new(timestamp_ms, entry_id))
    }

    /// Parse a cursor and reject it if older than `expiry_days` at `now`.
    ///
    /// Age is the age of the entry the cursor points at, not of the token.
    /// On an investigation quiet for longer than `expiry_days`, a freshly
    /// issued cursor is already expired and the poller restarts from the
    /// beginning.
    ///
    /// # Errors
    ///
    /// `CursorError::Malformed` as in [`Self::decode`], or
    /// `CursorError::Expired` for a valid but stale cursor.
    pub fn decode_fresh(
        token: &str,
        expiry_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, CursorError> {
        let cursor = Self::decode(token)?;
        let cutoff = now - Duration::days(i64::from(expiry_days));
        if cursor.timestamp_ms < cutoff.timestamp_millis() {
            let age_days = (now.timestamp_millis() - cursor.timestamp_ms) / 86_400_000;
            return Err(CursorError::Expired { age_days });
        }
        Ok(cursor)
    }

    #[must_use]
    pub const fn position(&self) -> (i64, i64) {
        (self.timestamp_ms, self.entry_id)
    }
}
