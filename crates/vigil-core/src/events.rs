//! Wire types for the investigation event feed.
//!
//! These are the shapes pollers see; ledger rows are converted into
//! `FeedEvent`s by `vigil-db`'s feed service.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ActionType, ActorType};

/// Who produced an event.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Actor {
    #[serde(rename = "type")]
    pub actor_type: ActorType,
    pub id: String,
}

/// One ledger entry as delivered to pollers.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FeedEvent {
    pub id: String,
    /// Unix milliseconds.
    pub ts: i64,
    pub op: ActionType,
    pub investigation_id: String,
    pub actor: Actor,
    pub payload: serde_json::Value,
    /// Investigation version after this event was applied.
    pub version: u64,
}

/// One page of the event feed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FeedPage {
    pub items: Vec<FeedEvent>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
    pub poll_after_seconds: u32,
    pub etag: String,
}
