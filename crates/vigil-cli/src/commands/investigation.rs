use vigil_core::enums::{ActionType, InvestigationStatus, LifecycleStage};
use vigil_db::updates::investigation::{InvestigationChangesBuilder, StateMutation};

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_enum;
use crate::commands::shared::{actor, resolve_version};
use crate::context::AppContext;
use crate::output::output;

/// Handle `vgl create`.
pub async fn create(
    owner: Option<&str>,
    id: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let owner = owner.unwrap_or(&flags.actor);
    let investigation = ctx.service.create_investigation(owner, id).await?;
    output(&investigation, flags.format)
}

/// Handle `vgl show`.
pub async fn show(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let investigation = ctx.service.get_investigation(id).await?;
    output(&investigation, flags.format)
}

/// Handle `vgl list`.
pub async fn list(
    status: Option<&str>,
    limit: u32,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let status = status
        .map(|value| parse_enum::<InvestigationStatus>(value, "status"))
        .transpose()?;
    let investigations = ctx.service.list_investigations(status, limit).await?;
    output(&investigations, flags.format)
}

/// Handle `vgl status`.
pub async fn status(
    id: &str,
    status: &str,
    stage: Option<&str>,
    expected_version: Option<u64>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut changes =
        InvestigationChangesBuilder::new().status(parse_enum::<InvestigationStatus>(status, "status")?);
    if let Some(stage) = stage {
        changes = changes.lifecycle_stage(parse_enum::<LifecycleStage>(stage, "stage")?);
    }

    let version = resolve_version(ctx, id, expected_version).await?;
    let mutation = StateMutation {
        action_type: ActionType::StatusChanged,
        actor: actor(flags),
        changes: changes.build(),
    };
    let outcome = ctx.service.write(id, &mutation, version).await?;
    output(&outcome, flags.format)
}

/// Handle `vgl finalize`.
pub async fn finalize(
    id: &str,
    expected_version: Option<u64>,
    complete: bool,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut changes = InvestigationChangesBuilder::new().finalize();
    if complete {
        changes = changes
            .status(InvestigationStatus::Completed)
            .lifecycle_stage(LifecycleStage::Completed);
    }

    let version = resolve_version(ctx, id, expected_version).await?;
    let mutation = StateMutation {
        action_type: ActionType::ResultsFinalized,
        actor: actor(flags),
        changes: changes.build(),
    };
    let outcome = ctx.service.write(id, &mutation, version).await?;
    output(&outcome, flags.format)
}

/// Handle `vgl verify`.
pub async fn verify(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let entries = ctx.service.verify_chain(id).await?;
    output(
        &serde_json::json!({
            "investigation_id": id,
            "entries": entries,
            "chain_intact": true,
        }),
        flags.format,
    )
}
