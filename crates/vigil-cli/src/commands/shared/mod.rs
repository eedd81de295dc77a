pub mod parse;

use vigil_core::events::Actor;

use crate::cli::GlobalFlags;
use crate::context::AppContext;

/// The ledger actor for this invocation.
pub fn actor(flags: &GlobalFlags) -> Actor {
    Actor {
        actor_type: flags.source,
        id: flags.actor.clone(),
    }
}

/// The caller's expected version, or the stored version when none was given.
pub async fn resolve_version(
    ctx: &AppContext,
    investigation_id: &str,
    expected: Option<u64>,
) -> anyhow::Result<u64> {
    match expected {
        Some(version) => Ok(version),
        None => Ok(ctx.service.get_investigation(investigation_id).await?.version),
    }
}
