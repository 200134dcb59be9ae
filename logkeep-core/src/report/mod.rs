//! Report fragments over the trailing 24-hour window.
//!
//! Each submodule renders one plain-text fragment for the daily digest. All
//! of them take pre-aggregated rows from the store so rendering stays pure
//! and testable.

mod format;
mod table;

pub mod access;
pub mod authfail;
pub mod mail;

#[cfg(test)]
mod tests;

pub use format::{iso8601_z, longint};
pub use table::TwoColumn;

use chrono::{DateTime, Duration, Utc};

/// Start of the reporting window: 24 hours before `now`.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(1)
}
