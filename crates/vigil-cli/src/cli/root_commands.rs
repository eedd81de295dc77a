use std::path::PathBuf;

use clap::Subcommand;

/// Top-level commands for the `vgl` binary.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Register a new investigation.
    Create {
        /// Owning user (defaults to --actor)
        #[arg(long)]
        owner: Option<String>,
        /// Explicit investigation ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// Show one investigation.
    Show { id: String },
    /// List investigations, most recently updated first.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Change status and/or lifecycle stage.
    Status {
        id: String,
        /// New status: pending, initializing, running, paused, completed, failed, cancelled
        status: String,
        /// New lifecycle stage: draft, submitted, in-progress, completed, failed
        #[arg(long)]
        stage: Option<String>,
        /// Version the caller last read (defaults to the current version)
        #[arg(long)]
        expected_version: Option<u64>,
    },
    /// Persist one domain's findings.
    Persist {
        id: String,
        domain: String,
        #[arg(long)]
        risk_score: Option<f64>,
        #[arg(long)]
        confidence: Option<f64>,
        #[arg(long)]
        evidence: Vec<String>,
        #[arg(long = "indicator")]
        indicators: Vec<String>,
        #[arg(long)]
        missing: Vec<String>,
        #[arg(long)]
        analysis: Option<String>,
        /// Version the caller last read (unversioned merge when omitted)
        #[arg(long)]
        expected_version: Option<u64>,
    },
    /// Show stored findings.
    Findings {
        id: String,
        #[arg(long)]
        domain: Option<String>,
    },
    /// Copy progress findings into results.
    Finalize {
        id: String,
        #[arg(long)]
        expected_version: Option<u64>,
        /// Also mark the investigation completed
        #[arg(long)]
        complete: bool,
    },
    /// Page through the investigation's event feed.
    Feed {
        id: String,
        #[arg(long)]
        cursor: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        /// Report not-modified instead of a page when the ETag still matches
        #[arg(long)]
        if_none_match: Option<String>,
    },
    /// Fuse stored findings into one risk assessment.
    Risk {
        id: String,
        /// JSON file with an array of {"amount", "risk_score"} records
        #[arg(long)]
        transactions: Option<PathBuf>,
        /// Reviewer outcome: fraud, legitimate, inconclusive
        #[arg(long)]
        manual_outcome: Option<String>,
        #[arg(long, requires = "tools_planned")]
        tools_executed: Option<u32>,
        #[arg(long, requires = "tools_executed")]
        tools_planned: Option<u32>,
    },
    /// Write the investigation and its ledger to a JSON file.
    Export {
        id: String,
        /// Target file; an existing file gets a sequence-numbered sibling
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check the ledger's version chain.
    Verify { id: String },
}
