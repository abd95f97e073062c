use chrono::NaiveTime;

use delorean_core::ScheduleTimes;

/// True iff `window_start ≤ tod ≤ window_end` (both ends inclusive).
pub fn is_within_window(tod: NaiveTime, times: &ScheduleTimes) -> bool {
    times.window_start <= tod && tod <= times.window_end
}

/// True iff `tod ≥ scheduled`.
///
/// The scheduled time alone never triggers anything: callers gate on
/// [`is_within_window`] first, so a scheduled time configured outside the
/// window reduces the effective trigger to the intersection.
pub fn is_at_or_past_scheduled(tod: NaiveTime, times: &ScheduleTimes) -> bool {
    tod >= times.scheduled
}
