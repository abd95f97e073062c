//! Log-driven failure analysis.
//!
//! All functions are pure over an ordered entry slice (oldest first, as
//! [`delorean_log::LogStore::read_all`] returns it) so the same log and
//! clock always produce the same answers.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use delorean_log::{LogEntry, Outcome};

/// True iff any Success entry is dated `today`.
pub fn has_succeeded_today(entries: &[LogEntry], today: NaiveDate) -> bool {
    entries
        .iter()
        .any(|e| e.outcome == Outcome::Success && e.timestamp.date() == today)
}

/// Count of NetworkUnreachable attempts dated `today` at/after `scheduled`,
/// scanning from the most recent entry backward and stopping at the first
/// Success: a success resets the failure streak, so failures older than the
/// most recent success never count.
pub fn failures_since_scheduled(
    entries: &[LogEntry],
    today: NaiveDate,
    scheduled: NaiveTime,
) -> usize {
    entries
        .iter()
        .rev()
        .take_while(|e| e.outcome != Outcome::Success)
        .filter(|e| {
            e.outcome == Outcome::NetworkUnreachable
                && e.timestamp.date() == today
                && e.timestamp.time() >= scheduled
        })
        .count()
}

/// Calendar days between `now` and the most recent Success entry.
///
/// `None` when no success exists anywhere in the log — a fresh install must
/// not trip the prolonged-failure alert on a meaningless default.
pub fn days_since_last_success(entries: &[LogEntry], now: NaiveDateTime) -> Option<i64> {
    entries
        .iter()
        .rev()
        .find(|e| e.outcome == Outcome::Success)
        .map(|e| now.date().signed_duration_since(e.timestamp.date()).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use delorean_log::TIMESTAMP_FORMAT;

    fn entry(ts: &str, outcome: Outcome) -> LogEntry {
        LogEntry::new(
            NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).unwrap(),
            outcome,
        )
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn success_today_is_date_bound() {
        let entries = vec![
            entry("2026-08-06 14:00:00", Outcome::Success),
            entry("2026-08-07 10:00:00", Outcome::NetworkUnreachable),
        ];
        assert!(has_succeeded_today(&entries, day("2026-08-06")));
        assert!(!has_succeeded_today(&entries, day("2026-08-07")));
        assert!(!has_succeeded_today(&[], day("2026-08-07")));
    }

    #[test]
    fn failure_count_ignores_attempts_before_scheduled_time() {
        let entries = vec![
            entry("2026-08-07 08:00:00", Outcome::NetworkUnreachable),
            entry("2026-08-07 14:05:00", Outcome::NetworkUnreachable),
            entry("2026-08-07 15:05:00", Outcome::NetworkUnreachable),
        ];
        assert_eq!(
            failures_since_scheduled(&entries, day("2026-08-07"), t(14, 0)),
            2
        );
    }

    #[test]
    fn failure_count_ignores_other_days_and_outcomes() {
        let entries = vec![
            entry("2026-08-06 15:00:00", Outcome::NetworkUnreachable),
            entry("2026-08-07 15:00:00", Outcome::UserAborted),
            entry("2026-08-07 15:30:00", Outcome::Other("disk full".into())),
            entry("2026-08-07 16:00:00", Outcome::NetworkUnreachable),
        ];
        assert_eq!(
            failures_since_scheduled(&entries, day("2026-08-07"), t(14, 0)),
            1
        );
    }

    #[test]
    fn success_resets_the_failure_streak() {
        let entries = vec![
            entry("2026-08-07 14:05:00", Outcome::NetworkUnreachable),
            entry("2026-08-07 14:35:00", Outcome::NetworkUnreachable),
            entry("2026-08-07 15:00:00", Outcome::Success),
            entry("2026-08-07 16:00:00", Outcome::NetworkUnreachable),
        ];
        assert_eq!(
            failures_since_scheduled(&entries, day("2026-08-07"), t(14, 0)),
            1
        );
    }

    #[test]
    fn days_since_last_success_counts_calendar_days() {
        let entries = vec![
            entry("2026-07-29 23:50:00", Outcome::Success),
            entry("2026-08-01 10:00:00", Outcome::NetworkUnreachable),
        ];
        let now = NaiveDateTime::parse_from_str("2026-08-08 00:10:00", TIMESTAMP_FORMAT).unwrap();
        assert_eq!(days_since_last_success(&entries, now), Some(10));
    }

    #[test]
    fn days_since_last_success_uses_most_recent_success() {
        let entries = vec![
            entry("2026-07-01 14:00:00", Outcome::Success),
            entry("2026-08-06 14:00:00", Outcome::Success),
            entry("2026-08-07 14:00:00", Outcome::NetworkUnreachable),
        ];
        let now = NaiveDateTime::parse_from_str("2026-08-08 14:00:00", TIMESTAMP_FORMAT).unwrap();
        assert_eq!(days_since_last_success(&entries, now), Some(2));
    }

    #[test]
    fn no_success_ever_yields_none() {
        let now = NaiveDateTime::parse_from_str("2026-08-08 14:00:00", TIMESTAMP_FORMAT).unwrap();
        assert_eq!(days_since_last_success(&[], now), None);

        let entries = vec![
            entry("2026-08-06 14:00:00", Outcome::NetworkUnreachable),
            entry("2026-08-07 14:00:00", Outcome::UserAborted),
        ];
        assert_eq!(days_since_last_success(&entries, now), None);
    }
}
