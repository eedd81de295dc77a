//! ID prefix constants and formatting helpers.

/// Prefix for generated investigation IDs: `inv-a3f8b2c1`.
pub const PREFIX_INVESTIGATION: &str = "inv";

/// Prefix for feed event IDs: `evt-42`.
pub const PREFIX_EVENT: &str = "evt";

/// Format the wire ID of a ledger entry.
#[must_use]
pub fn event_id(entry_id: i64) -> String {
    format!("{PREFIX_EVENT}-{entry_id}")
}

/// Recover the ledger entry ID from a wire event ID.
#[must_use]
pub fn parse_event_id(id: &str) -> Option<i64> {
    id.strip_prefix(PREFIX_EVENT)?
        .strip_prefix('-')?
        .parse()
        .ok()
}
