use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{ActorSource, GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `vgl` binary.
#[derive(Debug, Parser)]
#[command(name = "vgl", version, about = "Vigil - investigation state store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database file (overrides storage.database_path)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Actor ID recorded in the audit ledger and used for feed access
    #[arg(long, global = true, env = "VIGIL_ACTOR", default_value = "operator")]
    pub actor: String,

    /// Actor type recorded in the audit ledger
    #[arg(long, global = true, default_value = "user")]
    pub source: ActorSource,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            db: self.db.clone(),
            actor: self.actor.clone(),
            source: self.source.into(),
        }
    }
}
