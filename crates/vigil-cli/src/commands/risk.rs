use std::path::{Path, PathBuf};

use anyhow::Context;
use vigil_risk::{FusionInput, ManualOutcome, ToolCoverage, TransactionRecord};

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Default)]
pub struct RiskArgs {
    pub transactions: Option<PathBuf>,
    pub manual_outcome: Option<String>,
    pub tools_executed: Option<u32>,
    pub tools_planned: Option<u32>,
}

/// Handle `vgl risk`: fuse the investigation's progress findings.
pub async fn handle(
    id: &str,
    args: &RiskArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let investigation = ctx.service.get_investigation(id).await?;

    let transactions = match &args.transactions {
        Some(path) => read_transactions(path)?,
        None => Vec::new(),
    };
    let manual_outcome = args
        .manual_outcome
        .as_deref()
        .map(|value| parse_enum::<ManualOutcome>(value, "manual outcome"))
        .transpose()?;
    let tool_coverage = match (args.tools_executed, args.tools_planned) {
        (Some(executed), Some(planned)) => Some(ToolCoverage { executed, planned }),
        _ => None,
    };

    let input = FusionInput {
        findings: investigation.progress,
        transactions,
        manual_outcome,
        tool_coverage,
    };
    let assessment = ctx
        .engine
        .assess(&input)
        .with_context(|| format!("risk fusion failed for {id}"))?;
    output(&assessment, flags.format)
}

fn read_transactions(path: &Path) -> anyhow::Result<Vec<TransactionRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read transactions from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid transactions file {}", path.display()))
}
