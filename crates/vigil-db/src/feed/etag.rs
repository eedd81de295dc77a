//! Feed ETags: a short fingerprint of an investigation's current version.

use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Quoted ETag of the first 16 hex chars of `sha256("{id}:{version}")`.
#[must_use]
pub fn compute_etag(investigation_id: &str, version: u64) -> String {
    let digest = Sha256::digest(format!("{investigation_id}:{version}").as_bytes());
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        let _ = write!(hex, "{byte:02x}");
    }
    format!("\"{hex}\"")
}

/// Compare an `If-None-Match` style value with a computed ETag.
///
/// Accepts the value with or without quotes and a weak `W/` prefix.
#[must_use]
pub fn etag_matches(candidate: &str, etag: &str) -> bool {
    let normalize = |s: &str| {
        s.trim()
            .trim_start_matches("W/")
            .trim_matches('"')
            .to_ascii_lowercase()
    };
    normalize(candidate) == normalize(etag)
}
