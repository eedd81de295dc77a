//! Retry delay schedule: doubling from a base, capped, plus up to 10% jitter.

use std::time::Duration;

use rand::Rng;

/// Delay before retry number `attempt` (0-based), without jitter.
#[must_use]
pub fn base_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let factor = 1_u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor).min(max_ms))
}

/// Delay before retry number `attempt`, with up to 10% random jitter added
/// so contending processes drift apart.
#[must_use]
pub fn jittered_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let delay = base_delay(attempt, base_ms, max_ms);
    let jitter_cap = u64::try_from(delay.as_millis() / 10).unwrap_or(0);
    if jitter_cap == 0 {
        return delay;
    }
    let jitter = rand::thread_rng().gen_range(0..=jitter_cap);
    delay + Duration::from_millis(jitter)
}
