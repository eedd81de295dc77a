//! Cursor-paginated event feed over the audit ledger.
//!
//! Pollers ask for entries strictly after their cursor and get back a page
//! of [`FeedEvent`]s in `(timestamp, entry_id)` order, a cursor for the next
//! page, an ETag of the investigation's current version, and a hint for when
//! to poll again. The feed is read-only.

pub mod authz;
pub mod cursor;
pub mod etag;
pub mod poll;

pub use authz::{FeedAuthorizer, OwnerOrAdmin};
pub use cursor::{Cursor, CursorError};
pub use etag::{compute_etag, etag_matches};

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use vigil_config::EventFeedConfig;
use vigil_core::entities::AuditLogEntry;
use vigil_core::errors::ErrorKind;
use vigil_core::events::{Actor, FeedEvent, FeedPage};
use vigil_core::ids::event_id;

use crate::error::DatabaseError;
use crate::service::InvestigationService;

/// Errors returned by [`EventFeedService::fetch`].
#[derive(Debug, Error)]
pub enum FeedError {
    /// The cursor could not be decoded.
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// The cursor is well-formed but older than the retention window.
    #[error("Cursor expired ({age_days} days old, limit {limit_days})")]
    ExpiredCursor { age_days: i64, limit_days: u32 },

    #[error("User {user_id} may not read investigation {investigation_id}")]
    Unauthorized {
        user_id: String,
        investigation_id: String,
    },

    #[error("Investigation not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl FeedError {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidCursor(_) => "invalid_cursor",
            Self::ExpiredCursor { .. } => "expired_cursor",
            Self::Unauthorized { .. } => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Database(_) => "database_error",
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCursor(_) | Self::ExpiredCursor { .. } => ErrorKind::BadRequest,
            Self::Unauthorized { .. } => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Database(e) => e.kind(),
        }
    }
}

/// One feed request.
#[derive(Debug, Clone, Default)]
pub struct FeedRequest {
    pub investigation_id: String,
    pub user_id: String,
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

impl FeedRequest {
    pub fn new(investigation_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            investigation_id: investigation_id.into(),
            user_id: user_id.into(),
            cursor: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

pub struct EventFeedService {
    svc: Arc<InvestigationService>,
    config: EventFeedConfig,
    authorizer: Box<dyn FeedAuthorizer>,
}

impl EventFeedService {
    /// Feed with the default owner-or-admin authorizer built from
    /// `config.admin_users`.
    #[must_use]
    pub fn new(svc: Arc<InvestigationService>, config: EventFeedConfig) -> Self {
        let authorizer = Box::new(OwnerOrAdmin::new(config.admin_users.clone()));
        Self {
            svc,
            config,
            authorizer,
        }
    }

    #[must_use]
    pub fn with_authorizer(mut self, authorizer: Box<dyn FeedAuthorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &EventFeedConfig {
        &self.config
    }

    /// Clamp a requested page size into `[1, max_limit]`.
    #[must_use]
    pub fn effective_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.config.default_limit)
            .clamp(1, self.config.max_limit.max(1))
    }

    /// Fetch the next page of events after the request's cursor.
    ///
    /// # Errors
    ///
    /// - `FeedError::NotFound` for an unknown investigation
    /// - `FeedError::Unauthorized` if the user may not read it
    /// - `FeedError::InvalidCursor` / `FeedError::ExpiredCursor` for a bad cursor
    /// - `FeedError::Database` for storage failures
    pub async fn fetch(&self, request: &FeedRequest) -> Result<FeedPage, FeedError> {
        let investigation_id = request.investigation_id.as_str();
        let investigation = self
            .svc
            .find_investigation(investigation_id)
            .await?
            .ok_or_else(|| FeedError::NotFound(investigation_id.to_string()))?;

        if !self.authorizer.can_read(&request.user_id, &investigation) {
            return Err(FeedError::Unauthorized {
                user_id: request.user_id.clone(),
                investigation_id: investigation_id.to_string(),
            });
        }

        let now = Utc::now();
        let after = match request.cursor.as_deref() {
            None => None,
            Some(token) => Some(
                Cursor::decode_fresh(token, self.config.cursor_expiry_days, now).map_err(
                    |e| match e {
                        CursorError::Malformed(reason) => FeedError::InvalidCursor(reason),
                        CursorError::Expired { age_days } => FeedError::ExpiredCursor {
                            age_days,
                            limit_days: self.config.cursor_expiry_days,
                        },
                    },
                )?,
            ),
        };

        let limit = self.effective_limit(request.limit);
        let mut rows = self
            .svc
            .entries_after(investigation_id, after.map(|c| c.position()), limit.saturating_add(1))
            .await?;

        let has_more = rows.len() > limit as usize;
        rows.truncate(limit as usize);

        let next_cursor = match rows.last() {
            Some(last) => Some(Cursor::new(last.timestamp_ms, last.entry_id).encode()),
            None => request.cursor.clone(),
        };

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            match row.parsed {
                Ok(entry) => items.push(to_feed_event(entry)),
                Err(e) => {
                    tracing::warn!(
                        investigation_id,
                        entry_id = row.entry_id,
                        error = %e,
                        "skipping malformed ledger row"
                    );
                }
            }
        }

        let last_activity_ms = items
            .last()
            .map_or(investigation.updated_at.timestamp_millis(), |e| e.ts);
        let poll_after_seconds = poll::poll_after_seconds(
            &self.config.poll,
            has_more,
            investigation.status,
            last_activity_ms,
            now.timestamp_millis(),
        );

        Ok(FeedPage {
            items,
            next_cursor,
            has_more,
            poll_after_seconds,
            etag: compute_etag(investigation_id, investigation.version),
        })
    }

    /// Whether `etag` still describes the investigation's current version.
    ///
    /// An unknown investigation is never "not modified".
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Database` for storage failures.
    pub async fn is_not_modified(&self, investigation_id: &str, etag: &str) -> Result<bool, FeedError> {
        let Some(investigation) = self.svc.find_investigation(investigation_id).await? else {
            return Ok(false);
        };
        Ok(etag_matches(
            etag,
            &compute_etag(investigation_id, investigation.version),
        ))
    }
}

fn to_feed_event(entry: AuditLogEntry) -> FeedEvent {
    FeedEvent {
        id: event_id(entry.entry_id),
        ts: entry.timestamp_ms,
        op: entry.action_type,
        investigation_id: entry.investigation_id,
        actor: Actor {
            actor_type: entry.source,
            id: entry.user_id,
        },
        payload: entry.changes,
        version: entry.to_version,
    }
}
