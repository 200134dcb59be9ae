use crate::error::ParseError;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// One rejected SSH authentication attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthFailEvent {
    pub timestamp: DateTime<FixedOffset>,
    pub username: String,
    pub src_addr: String,
}

/// The two sshd message dialects we recognize, tried in order; the first
/// pattern that matches the whole line wins. Both capture `timestamp`,
/// `username`, and `src_addr`. Keep this a flat ordered list; do not add
/// dialects beyond these two.
static MSG_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(concat!(
            r"^(?P<timestamp>\S+) \S+ sshd\[\d+\]:",
            r"(?: message repeated \d+ times: \[)?",
            r" Failed (?:password|keyboard-interactive/pam|none)",
            r" for (?:invalid user )?(?P<username>.+?)",
            r" from (?P<src_addr>\S+) port \d+ ssh2\]?\s*$",
        ))
        .expect("authfail pattern 1"),
        Regex::new(concat!(
            r"^(?P<timestamp>\S+) \S+ sshd\[\d+\]:",
            r"(?: message repeated \d+ times: \[)?",
            r" Invalid user (?P<username>.*?)",
            r" from (?P<src_addr>\S+) port \d+\s*$",
        ))
        .expect("authfail pattern 2"),
    ]
});

/// Parse one sshd authentication-failure line.
pub fn parse_authfail_line(line: &str) -> Result<AuthFailEvent, ParseError> {
    for pattern in MSG_PATTERNS.iter() {
        let Some(caps) = pattern.captures(line) else {
            continue;
        };

        let raw_ts = &caps["timestamp"];
        // Some syslog setups emit the timestamp without a UTC offset; treat
        // those as UTC rather than aborting the run.
        let timestamp = match DateTime::parse_from_rfc3339(raw_ts) {
            Ok(ts) => ts,
            Err(_) => raw_ts
                .parse::<NaiveDateTime>()
                .map(|naive| naive.and_utc().fixed_offset())
                .map_err(|e| ParseError::timestamp(raw_ts, e))?,
        };

        return Ok(AuthFailEvent {
            timestamp,
            username: caps["username"].to_owned(),
            src_addr: caps["src_addr"].to_owned(),
        });
    }

    Err(ParseError::NoMatch)
}
