use vigil_db::updates::findings::FindingsUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::commands::shared::actor;
use crate::context::AppContext;
use crate::output::output;

/// Field values for `vgl persist`. Unset fields keep their stored value.
#[derive(Debug, Default)]
pub struct PersistArgs {
    pub risk_score: Option<f64>,
    pub confidence: Option<f64>,
    pub evidence: Vec<String>,
    pub indicators: Vec<String>,
    pub missing: Vec<String>,
    pub analysis: Option<String>,
    pub expected_version: Option<u64>,
}

/// Handle `vgl persist`.
pub async fn persist(
    id: &str,
    domain: &str,
    args: PersistArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut update = FindingsUpdateBuilder::new();
    if let Some(score) = args.risk_score {
        update = update.risk_score(score);
    }
    if let Some(confidence) = args.confidence {
        update = update.confidence(confidence);
    }
    if !args.evidence.is_empty() {
        update = update.evidence(args.evidence);
    }
    if !args.indicators.is_empty() {
        update = update.risk_indicators(args.indicators);
    }
    if !args.missing.is_empty() {
        update = update.missing_evidence(args.missing);
    }
    if let Some(analysis) = args.analysis {
        update = update.llm_analysis(analysis);
    }

    let outcome = ctx
        .service
        .persist_findings(id, domain, &update.build(), actor(flags), args.expected_version)
        .await?;
    output(&outcome, flags.format)
}

/// Handle `vgl findings`.
pub async fn show(
    id: &str,
    domain: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let findings = ctx.service.retrieve_findings(id, domain).await?;
    output(&findings, flags.format)
}
