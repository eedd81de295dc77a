//! Domain findings store.
//!
//! Each analysis domain writes its own key of `progress`. Writes go through
//! the versioned write path so every persist lands in the ledger.

use chrono::Utc;

use vigil_core::entities::DomainFindings;
use vigil_core::enums::ActionType;
use vigil_core::events::Actor;

use crate::error::DatabaseError;
use crate::repos::investigation::WriteOutcome;
use crate::service::InvestigationService;
use crate::updates::findings::FindingsUpdate;
use crate::updates::investigation::{InvestigationChangesBuilder, StateMutation};

impl InvestigationService {
    /// Merge `update` into `progress[domain]` and stamp `persisted_at`.
    ///
    /// With `expected_version`, this is an ordinary compare-and-swap write.
    /// Without it, a lost version race is retried against the fresh version
    /// only while this domain's stored value is still the one first read; if
    /// another writer changed the same domain, the conflict is returned.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::Validation` for an empty domain name
    /// - `DatabaseError::NotFound` if the investigation does not exist
    /// - `DatabaseError::VersionConflict` as described above
    pub async fn persist_findings(
        &self,
        investigation_id: &str,
        domain: &str,
        update: &FindingsUpdate,
        actor: Actor,
        expected_version: Option<u64>,
    ) -> Result<WriteOutcome, DatabaseError> {
        if domain.trim().is_empty() {
            return Err(DatabaseError::Validation("domain must not be empty".into()));
        }

        let mut current = self.get_investigation(investigation_id).await?;
        let baseline = current.progress.get(domain).cloned();
        let retry_limit = self.findings_config().unversioned_retry_limit;
        let mut retries = 0_u32;

        loop {
            let version = expected_version.unwrap_or(current.version);
            let merged = update.apply(current.progress.get(domain), Utc::now());
            let mut progress = DomainFindings::new();
            progress.insert(domain, merged);

            let mutation = StateMutation {
                action_type: ActionType::FindingsPersisted,
                actor: actor.clone(),
                changes: InvestigationChangesBuilder::new().progress(progress).build(),
            };

            match self.write(investigation_id, &mutation, version).await {
                Ok(outcome) => return Ok(outcome),
                Err(DatabaseError::VersionConflict { actual, .. })
                    if expected_version.is_none() && retries < retry_limit =>
                {
                    current = self.get_investigation(investigation_id).await?;
                    if current.progress.get(domain) != baseline.as_ref() {
                        tracing::warn!(
                            investigation_id,
                            domain,
                            actual,
                            "same domain changed concurrently, not overwriting"
                        );
                        return Err(DatabaseError::VersionConflict {
                            investigation_id: investigation_id.to_string(),
                            expected: version,
                            actual: current.version,
                        });
                    }
                    retries += 1;
                    tracing::debug!(
                        investigation_id,
                        domain,
                        retries,
                        version = current.version,
                        "unversioned persist lost a race on another domain, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Stored findings for one domain, or every domain.
    ///
    /// A missing investigation or domain yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` only for storage failures.
    pub async fn retrieve_findings(
        &self,
        investigation_id: &str,
        domain: Option<&str>,
    ) -> Result<DomainFindings, DatabaseError> {
        let Some(investigation) = self.find_investigation(investigation_id).await? else {
            return Ok(DomainFindings::new());
        };
        Ok(match domain {
            None => investigation.progress,
            Some(domain) => investigation
                .progress
                .iter()
                .filter(|(key, _)| key.as_str() == domain)
                .map(|(key, finding)| (key.clone(), finding.clone()))
                .collect(),
        })
    }
}
