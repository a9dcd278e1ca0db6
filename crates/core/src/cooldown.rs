//! Cooldown clock: how long until the next reward may be attempted.
//!
//! Everything here is a pure function of its inputs; recurring re-checks
//! belong to whoever displays the countdown.

use chrono::{DateTime, Duration, Utc};

/// Time left before the next claim is allowed.
///
/// Returns `max(0, delay - (now - last_claim))`, or zero when there has been
/// no claim or `delay` is zero. A `last_claim` in the future (clock skew)
/// never yields more than `delay`.
#[must_use]
pub fn remaining(now: DateTime<Utc>, last_claim: Option<DateTime<Utc>>, delay: Duration) -> Duration {
    let Some(last) = last_claim else {
        return Duration::zero();
    };
    if delay <= Duration::zero() {
        return Duration::zero();
    }
    let elapsed = now.signed_duration_since(last).max(Duration::zero());
    (delay - elapsed).max(Duration::zero())
}

/// Whether the cooldown gates the frontier slot.
///
/// The first reward is never time-gated and a finished book has nothing left
/// to gate, so this is only true for `0 < collected < total`.
#[must_use]
pub fn is_active(collected: usize, total: usize, remaining: Duration) -> bool {
    collected > 0 && collected < total && remaining > Duration::zero()
}

/// Render a countdown as `m:ss`, rounding partial seconds up.
#[must_use]
pub fn format_countdown(remaining: Duration) -> String {
    let millis = remaining.num_milliseconds().max(0);
    let total_secs = (millis + 999) / 1000;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes}:{seconds:02}")
}
