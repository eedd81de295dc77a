//! Update builder types for investigation mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some`
//! fields change stored state. The serialized update becomes the ledger
//! entry's `changes` payload (changed fields only).

pub mod findings;
pub mod investigation;
