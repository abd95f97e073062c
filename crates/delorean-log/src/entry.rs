use chrono::NaiveDateTime;

/// Fixed-width timestamp prefix on every log line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Byte length of a rendered timestamp — the classification text starts
/// after this prefix and the " - " separator.
const TIMESTAMP_LEN: usize = 19;

const SUCCESS_PHRASE: &str = "Backup completed successfully";
const NETWORK_PHRASE: &str = "Backup Failed: Network drive inaccessible";
const ABORT_PHRASE: &str = "Backup Failed: User aborted backup";

/// Classification of one backup attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    NetworkUnreachable,
    UserAborted,
    /// Unrecognized free text — preserved on read, ignored by alert logic.
    Other(String),
}

impl Outcome {
    /// The exact on-disk phrase for this outcome.
    pub fn classification(&self) -> &str {
        match self {
            Outcome::Success => SUCCESS_PHRASE,
            Outcome::NetworkUnreachable => NETWORK_PHRASE,
            Outcome::UserAborted => ABORT_PHRASE,
            Outcome::Other(text) => text,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.classification())
    }
}

/// One immutable line of the backup event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub outcome: Outcome,
}

impl LogEntry {
    pub fn new(timestamp: NaiveDateTime, outcome: Outcome) -> Self {
        Self { timestamp, outcome }
    }

    /// Render the entry in the stable legacy line format.
    pub fn render(&self) -> String {
        format!(
            "{} - {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.outcome.classification()
        )
    }

    /// Parse one log line.
    ///
    /// The first 19 bytes must be a valid timestamp; classification is by
    /// substring containment on the whole line, matching how the legacy
    /// tooling reads the file. Returns `None` for malformed lines.
    pub fn parse(line: &str) -> Option<Self> {
        if line.len() < TIMESTAMP_LEN || !line.is_char_boundary(TIMESTAMP_LEN) {
            return None;
        }
        let timestamp =
            NaiveDateTime::parse_from_str(&line[..TIMESTAMP_LEN], TIMESTAMP_FORMAT).ok()?;

        let outcome = if line.contains(SUCCESS_PHRASE) {
            Outcome::Success
        } else if line.contains(NETWORK_PHRASE) {
            Outcome::NetworkUnreachable
        } else if line.contains(ABORT_PHRASE) {
            Outcome::UserAborted
        } else {
            let text = line[TIMESTAMP_LEN..]
                .strip_prefix(" - ")
                .unwrap_or(&line[TIMESTAMP_LEN..])
                .trim();
            Outcome::Other(text.to_string())
        };

        Some(Self { timestamp, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn success_line_round_trip() {
        let line = "2026-08-07 14:30:00 - Backup completed successfully";
        let entry = LogEntry::parse(line).unwrap();
        assert_eq!(entry.timestamp, ts("2026-08-07 14:30:00"));
        assert_eq!(entry.outcome, Outcome::Success);
        assert_eq!(entry.render(), line);
    }

    #[test]
    fn network_failure_line_round_trip() {
        let line = "2026-08-07 14:30:00 - Backup Failed: Network drive inaccessible";
        let entry = LogEntry::parse(line).unwrap();
        assert_eq!(entry.outcome, Outcome::NetworkUnreachable);
        assert_eq!(entry.render(), line);
    }

    #[test]
    fn abort_line_round_trip() {
        let line = "2026-08-07 09:00:12 - Backup Failed: User aborted backup";
        let entry = LogEntry::parse(line).unwrap();
        assert_eq!(entry.outcome, Outcome::UserAborted);
        assert_eq!(entry.render(), line);
    }

    #[test]
    fn classification_is_containment_not_exact_suffix() {
        // Legacy writers sometimes appended trailing detail after the phrase.
        let line = "2026-08-07 14:30:00 - Backup completed successfully (2.1 GB)";
        assert_eq!(LogEntry::parse(line).unwrap().outcome, Outcome::Success);
    }

    #[test]
    fn unknown_text_is_preserved_as_other() {
        let line = "2026-08-07 14:30:00 - Backup Failed: Sync process exited with status 23";
        let entry = LogEntry::parse(line).unwrap();
        assert_eq!(
            entry.outcome,
            Outcome::Other("Backup Failed: Sync process exited with status 23".to_string())
        );
        assert_eq!(entry.render(), line);
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        assert!(LogEntry::parse("not a timestamp - Backup completed successfully").is_none());
        assert!(LogEntry::parse("2026-08-07").is_none());
        assert!(LogEntry::parse("").is_none());
    }
}
