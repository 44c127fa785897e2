//! Exponential back-off schedule for location retries.

use std::time::Duration;

/// Delay before retry number `attempt` (zero-based).
///
/// `base * 2^attempt`, capped at `cap`. With the default 2 s base and 10 s
/// cap:
///
/// | Attempt | Delay   |
/// |---------|---------|
/// | 0       | 2 000 ms |
/// | 1       | 4 000 ms |
/// | 2       | 8 000 ms |
/// | 3+      | 10 000 ms |
#[must_use]
pub fn retry_delay(attempt: u32, base: Duration, cap: Duration) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    base.checked_mul(factor).unwrap_or(cap).min(cap)
}
