use crate::error::ParseError;
use chrono::{DateTime, FixedOffset};
use std::str::FromStr;

/// One web-server access record.
///
/// The upstream log format is:
/// `%{%Y-%m-%d %H:%M:%S %z}t|%v|%p|%a|%I|%O|%D|%>s|["%u", "%r", "%m",
///  "%U%q", "%H", "%{Referer}i", "%{User-Agent}i"]`
#[derive(Debug, Clone, PartialEq)]
pub struct AccessEvent {
    pub timestamp: DateTime<FixedOffset>,
    pub host: String,
    pub port: u16,
    pub src_addr: String,
    pub authuser: String,
    pub bytes_in: i64,
    pub bytes_out: i64,
    pub micros: i64,
    pub status: u16,
    pub reqline: String,
    pub method: String,
    pub path: String,
    pub protocol: String,
    pub referer: String,
    pub user_agent: String,
}

const FIELD_COUNT: usize = 9;
const QUOTED_STRINGS: usize = 7;

/// Parse one `|`-delimited access-log line.
pub fn parse_access_line(line: &str) -> Result<AccessEvent, ParseError> {
    let fields: Vec<&str> = line.splitn(FIELD_COUNT, '|').collect();
    if fields.len() != FIELD_COUNT {
        return Err(ParseError::FieldCount {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }

    let timestamp = DateTime::parse_from_str(fields[0], "%Y-%m-%d %H:%M:%S %z")
        .map_err(|e| ParseError::timestamp(fields[0], e))?;

    let quoted: Vec<String> = serde_json::from_str(&hex_escapes_to_unicode(fields[8]))
        .map_err(ParseError::ArrayLiteral)?;
    if quoted.len() != QUOTED_STRINGS {
        return Err(ParseError::ArrayLen {
            expected: QUOTED_STRINGS,
            found: quoted.len(),
        });
    }
    let mut decoded = quoted
        .iter()
        .map(|s| reencode(s))
        .collect::<Result<Vec<_>, _>>()?;

    // Fixed order: authuser, reqline, method, path, protocol, referer,
    // user-agent. Pop from the back to take ownership without cloning.
    let user_agent = decoded.pop().unwrap_or_default();
    let referer = decoded.pop().unwrap_or_default();
    let protocol = decoded.pop().unwrap_or_default();
    let path = decoded.pop().unwrap_or_default();
    let method = decoded.pop().unwrap_or_default();
    let reqline = decoded.pop().unwrap_or_default();
    let authuser = decoded.pop().unwrap_or_default();

    Ok(AccessEvent {
        timestamp,
        host: fields[1].to_owned(),
        port: int_field(fields[2], "port")?,
        src_addr: fields[3].to_owned(),
        bytes_in: int_field(fields[4], "bytes_in")?,
        bytes_out: int_field(fields[5], "bytes_out")?,
        micros: int_field(fields[6], "micros")?,
        status: int_field(fields[7], "status")?,
        authuser,
        reqline,
        method,
        path,
        protocol,
        referer,
        user_agent,
    })
}

fn int_field<T: FromStr>(value: &str, field: &'static str) -> Result<T, ParseError> {
    value
        .parse()
        .map_err(|_| ParseError::invalid_int(field, value))
}

/// The log writer escapes raw high bytes as `\xhh`, which the JSON grammar
/// does not allow. Rewrite each such escape as `\u00hh`, leaving every other
/// escape sequence untouched.
fn hex_escapes_to_unicode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('x') => out.push_str("\\u00"),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Undo the upstream transcoding accident: the quoted strings were UTF-8 text
/// decoded as Latin-1 before being written out. Mapping each char back to its
/// Latin-1 byte and re-decoding as UTF-8 restores the original text.
fn reencode(s: &str) -> Result<String, ParseError> {
    let mut bytes = Vec::with_capacity(s.len());
    for ch in s.chars() {
        let cp = u32::from(ch);
        if cp > 0xFF {
            return Err(ParseError::Reencode { value: s.to_owned() });
        }
        bytes.push(cp as u8);
    }
    String::from_utf8(bytes).map_err(|_| ParseError::Reencode { value: s.to_owned() })
}
