use clap::ValueEnum;
use vigil_core::enums::ActorType;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Raw,
}

/// Who the operator acts as when writing the audit ledger.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ActorSource {
    User,
    Agent,
    System,
    Job,
}

impl From<ActorSource> for ActorType {
    fn from(source: ActorSource) -> Self {
        match source {
            ActorSource::User => Self::User,
            ActorSource::Agent => Self::Agent,
            ActorSource::System => Self::System,
            ActorSource::Job => Self::Job,
        }
    }
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub db: Option<String>,
    pub actor: String,
    pub source: ActorType,
}
