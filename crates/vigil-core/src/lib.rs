//! # vigil-core
//!
//! Core types and error types for the Vigil investigation store.
//!
//! This crate provides the foundational types shared across all Vigil crates:
//! - Entity structs (investigations, audit ledger entries, domain findings)
//! - Status enums with state machine transitions
//! - ID prefix constants and formatting helpers
//! - Event feed wire types
//! - The caller-facing `ErrorKind` every crate error maps onto

pub mod entities;
pub mod enums;
pub mod errors;
pub mod events;
pub mod ids;
