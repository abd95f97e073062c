//! `delorean-core` — configuration and shared error type.
//!
//! Config is loaded from `delorean.toml` with `DELOREAN_*` env overrides,
//! or imported from the key=value pairs embedded in the legacy backup shell
//! script. [`DeloreanConfig::resolve`] turns the raw (stringly) file shape
//! into validated, typed values the scheduler consumes.

pub mod config;
pub mod error;

pub use config::{DeloreanConfig, ResolvedConfig, ScheduleTimes};
pub use error::{DeloreanError, Result};
