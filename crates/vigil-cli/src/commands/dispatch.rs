use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Create { owner, id } => {
            commands::investigation::create(owner.as_deref(), id.as_deref(), ctx, flags).await
        }
        Commands::Show { id } => commands::investigation::show(&id, ctx, flags).await,
        Commands::List { status, limit } => {
            commands::investigation::list(status.as_deref(), limit, ctx, flags).await
        }
        Commands::Status {
            id,
            status,
            stage,
            expected_version,
        } => {
            commands::investigation::status(&id, &status, stage.as_deref(), expected_version, ctx, flags)
                .await
        }
        Commands::Persist {
            id,
            domain,
            risk_score,
            confidence,
            evidence,
            indicators,
            missing,
            analysis,
            expected_version,
        } => {
            let args = commands::findings::PersistArgs {
                risk_score,
                confidence,
                evidence,
                indicators,
                missing,
                analysis,
                expected_version,
            };
            commands::findings::persist(&id, &domain, args, ctx, flags).await
        }
        Commands::Findings { id, domain } => {
            commands::findings::show(&id, domain.as_deref(), ctx, flags).await
        }
        Commands::Finalize {
            id,
            expected_version,
            complete,
        } => commands::investigation::finalize(&id, expected_version, complete, ctx, flags).await,
        Commands::Feed {
            id,
            cursor,
            limit,
            if_none_match,
        } => {
            commands::feed::handle(&id, cursor, limit, if_none_match.as_deref(), ctx, flags).await
        }
        Commands::Risk {
            id,
            transactions,
            manual_outcome,
            tools_executed,
            tools_planned,
        } => {
            let args = commands::risk::RiskArgs {
                transactions,
                manual_outcome,
                tools_executed,
                tools_planned,
            };
            commands::risk::handle(&id, &args, ctx, flags).await
        }
        Commands::Export { id, out } => commands::export::handle(&id, out, ctx, flags).await,
        Commands::Verify { id } => commands::investigation::verify(&id, ctx, flags).await,
    }
}
