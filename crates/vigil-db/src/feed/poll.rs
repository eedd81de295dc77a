//! Adaptive `poll_after_seconds` hint.

use vigil_config::PollConfig;
use vigil_core::enums::InvestigationStatus;

/// Seconds a poller should wait before asking again.
///
/// `last_activity_ms` is the newest known event time for the investigation.
#[must_use]
pub fn poll_after_seconds(
    config: &PollConfig,
    has_more: bool,
    status: InvestigationStatus,
    last_activity_ms: i64,
    now_ms: i64,
) -> u32 {
    if has_more {
        return 0;
    }
    if status.is_terminal() {
        return config.terminal_secs;
    }
    let window_ms = i64::from(config.active_window_secs) * 1000;
    if now_ms.saturating_sub(last_activity_ms) <= window_ms {
        config.active_secs
    } else {
        config.idle_secs
    }
}
