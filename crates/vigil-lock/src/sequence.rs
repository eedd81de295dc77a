//! Collision-free artifact paths without prior coordination.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::LockError;

/// Return `base` if it does not exist, otherwise the first free
/// `<base>__seq<N>` for `N` in `1..=max_sequence`.
///
/// Nothing is created; two calls without an intervening write return the
/// same path.
///
/// # Errors
///
/// Returns `LockError::SequenceExhausted` if every candidate exists.
pub fn get_sequence_numbered_path(base: &Path, max_sequence: u32) -> Result<PathBuf, LockError> {
    if !base.exists() {
        return Ok(base.to_path_buf());
    }

    for seq in 1..=max_sequence {
        let candidate = sequence_path(base, seq);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(LockError::SequenceExhausted {
        base: base.to_path_buf(),
        max_sequence,
    })
}

/// `report.json` + 2 -> `report.json__seq2`.
fn sequence_path(base: &Path, seq: u32) -> PathBuf {
    let mut name = base.file_name().map(OsString::from).unwrap_or_default();
    name.push(format!("__seq{seq}"));
    base.with_file_name(name)
}
