//! Typed events and the pure parsers that produce them.
//!
//! Each parser is a function from one raw input unit (a log line, or a whole
//! message for mail) to a validated event value. Parsing never touches the
//! store; persistence happens at the ingest boundary.

mod access;
mod authfail;
mod mail;


pub use access::{AccessEvent, parse_access_line};
pub use authfail::{AuthFailEvent, parse_authfail_line};
pub use mail::{Address, NO_SUBJECT, ParsedMail, parse_mail_message};
