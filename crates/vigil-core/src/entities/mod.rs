//! Entity structs for the investigation store.
//!
//! Each entity maps to a table in the libSQL database (see
//! `vigil-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON roundtrip and schema validation.

mod audit;
mod finding;
mod investigation;

pub use audit::AuditLogEntry;
pub use finding::{DomainFinding, DomainFindings};
pub use investigation::Investigation;
