use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use vigil_core::entities::{AuditLogEntry, Investigation};
use vigil_lock::FileLocker;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Highest `__seqN` suffix tried before giving up.
const MAX_EXPORT_SEQUENCE: u32 = 999;

#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub investigation: Investigation,
    pub ledger: Vec<AuditLogEntry>,
}

/// Handle `vgl export`.
pub async fn handle(
    id: &str,
    out: Option<PathBuf>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let investigation = ctx.service.get_investigation(id).await?;
    let ledger = ctx.service.entries_for(id).await?;
    let document = ExportDocument {
        investigation,
        ledger,
    };

    let base = out.unwrap_or_else(|| PathBuf::from(format!("{id}.json")));
    let locker = ctx.locker.clone();
    let written = tokio::task::spawn_blocking(move || write_export(&locker, &base, &document))
        .await
        .context("export task panicked")??;

    tracing::debug!(investigation_id = id, path = %written.display(), "export written");
    output(
        &serde_json::json!({ "investigation_id": id, "path": written }),
        flags.format,
    )
}

/// Write `document` next to `base` without clobbering earlier exports.
///
/// Path selection and the write happen under one lock on `<base>.lock`, so
/// concurrent exports of the same base never pick the same file.
pub fn write_export(
    locker: &FileLocker,
    base: &Path,
    document: &ExportDocument,
) -> anyhow::Result<PathBuf> {
    let json = serde_json::to_string_pretty(document)?;
    let mut lock_name = base.as_os_str().to_owned();
    lock_name.push(".lock");
    let lock_path = PathBuf::from(lock_name);

    locker.with_lock(&lock_path, true, |_| -> anyhow::Result<PathBuf> {
        let target = locker.get_sequence_numbered_path(base, MAX_EXPORT_SEQUENCE)?;
        std::fs::write(&target, &json)
            .with_context(|| format!("failed to write export {}", target.display()))?;
        Ok(target)
    })?
}
