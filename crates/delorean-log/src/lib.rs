//! `delorean-log` — the append-only backup event log.
//!
//! One entry per line, `"<yyyy-MM-dd HH:mm:ss> - <classification>"`, shared
//! with the legacy tooling. The on-disk format is stable: writes emit the
//! exact legacy phrases and reads classify by substring containment.
//!
//! | Phrase                                        | Outcome              |
//! |-----------------------------------------------|----------------------|
//! | `Backup completed successfully`               | `Success`            |
//! | `Backup Failed: Network drive inaccessible`   | `NetworkUnreachable` |
//! | `Backup Failed: User aborted backup`          | `UserAborted`        |
//! | anything else                                 | `Other` (preserved)  |

pub mod entry;
pub mod error;
pub mod store;

pub use entry::{LogEntry, Outcome, TIMESTAMP_FORMAT};
pub use error::{LogError, Result};
pub use store::LogStore;
