use std::path::PathBuf;
use std::sync::Arc;

use vigil_config::VigilConfig;
use vigil_db::feed::EventFeedService;
use vigil_db::service::InvestigationService;
use vigil_lock::FileLocker;
use vigil_risk::RiskEngine;

/// Everything a command handler needs, built once per invocation.
pub struct AppContext {
    pub service: Arc<InvestigationService>,
    pub feed: EventFeedService,
    pub locker: FileLocker,
    pub engine: RiskEngine,
}

impl AppContext {
    /// Open storage and wire services from a validated config.
    pub async fn init(config: &VigilConfig) -> anyhow::Result<Self> {
        let locker = FileLocker::new(config.file_lock.clone());
        let journal_dir = config
            .storage
            .has_journal()
            .then(|| PathBuf::from(&config.storage.journal_dir));

        let service = InvestigationService::new_local(
            &config.storage.database_path,
            journal_dir,
            locker.clone(),
        )
        .await?
        .with_findings_config(config.findings.clone());
        let service = Arc::new(service);

        let feed = EventFeedService::new(Arc::clone(&service), config.event_feed.clone());
        let engine = RiskEngine::new(config.fusion.clone());

        tracing::debug!(
            database = %config.storage.database_path,
            journal = config.storage.has_journal(),
            "application context ready"
        );

        Ok(Self {
            service,
            feed,
            locker,
            engine,
        })
    }
}
