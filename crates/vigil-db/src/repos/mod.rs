//! Repository modules for investigation state, the audit ledger, and
//! domain findings.
//!
//! Each module adds methods to `InvestigationService` via
//! `impl InvestigationService` blocks.

pub mod audit;
pub mod findings;
pub mod investigation;

pub use audit::LedgerRow;
pub use investigation::WriteOutcome;
