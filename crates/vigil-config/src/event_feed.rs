//! Event feed pagination, cursor expiry, and poll hints.

use serde::{Deserialize, Serialize};

const fn default_limit() -> u32 {
    100
}

const fn default_max_limit() -> u32 {
    1000
}

const fn default_cursor_expiry_days() -> u32 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventFeedConfig {
    /// Page size when the caller does not ask for one.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Upper bound for the requested page size.
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,

    /// Cursors older than this are rejected as expired.
    #[serde(default = "default_cursor_expiry_days")]
    pub cursor_expiry_days: u32,

    /// Users allowed to read every investigation's feed.
    #[serde(default)]
    pub admin_users: Vec<String>,

    #[serde(default)]
    pub poll: PollConfig,
}

impl Default for EventFeedConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            cursor_expiry_days: default_cursor_expiry_days(),
            admin_users: Vec::new(),
            poll: PollConfig::default(),
        }
    }
}

const fn default_active_secs() -> u32 {
    2
}

const fn default_idle_secs() -> u32 {
    10
}

const fn default_terminal_secs() -> u32 {
    60
}

const fn default_active_window_secs() -> u32 {
    30
}

/// Inputs to the adaptive `poll_after_seconds` hint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollConfig {
    /// Hint while the investigation is producing events.
    #[serde(default = "default_active_secs")]
    pub active_secs: u32,

    /// Hint when nothing happened recently.
    #[serde(default = "default_idle_secs")]
    pub idle_secs: u32,

    /// Hint once the investigation reached a terminal status.
    #[serde(default = "default_terminal_secs")]
    pub terminal_secs: u32,

    /// An event younger than this counts as recent activity.
    #[serde(default = "default_active_window_secs")]
    pub active_window_secs: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            active_secs: default_active_secs(),
            idle_secs: default_idle_secs(),
            terminal_secs: default_terminal_secs(),
            active_window_secs: default_active_window_secs(),
        }
    }
}
