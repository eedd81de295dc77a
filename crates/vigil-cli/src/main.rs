use anyhow::Context;
use clap::Parser;
use vigil_config::VigilConfig;
use vigil_core::errors::ErrorKind;

mod cli;
mod commands;
mod context;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        match error_kind(&error) {
            Some(kind) => eprintln!("vgl error [{kind}]: {error:#}"),
            None => eprintln!("vgl error: {error:#}"),
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    let mut config = VigilConfig::load_with_dotenv().context("failed to load vigil configuration")?;
    if let Some(db) = &flags.db {
        config.storage.database_path.clone_from(db);
    }

    let ctx = context::AppContext::init(&config)
        .await
        .context("failed to initialize vigil application context")?;

    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("VIGIL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// Classify the first typed error in the chain.
fn error_kind(error: &anyhow::Error) -> Option<ErrorKind> {
    error.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<vigil_db::error::DatabaseError>() {
            Some(e.kind())
        } else if let Some(e) = cause.downcast_ref::<vigil_db::feed::FeedError>() {
            Some(e.kind())
        } else if let Some(e) = cause.downcast_ref::<vigil_lock::LockError>() {
            Some(e.kind())
        } else if let Some(e) = cause.downcast_ref::<vigil_risk::RiskError>() {
            Some(e.kind())
        } else {
            cause
                .downcast_ref::<vigil_config::ConfigError>()
                .map(|_| ErrorKind::BadRequest)
        }
    })
}
