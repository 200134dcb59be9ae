use crate::error::ParseError;
use chrono::{DateTime, FixedOffset};

/// Subject recorded when the header is absent.
pub const NO_SUBJECT: &str = "NO SUBJECT";

/// An RFC 5322 mailbox: display name (possibly empty) plus addr-spec.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Address {
    pub realname: String,
    pub addr: String,
}

/// Structural view of one delivered message. Contact persistence and
/// recipient dedup happen at the ingest/store boundary, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMail {
    pub subject: String,
    pub sender: Address,
    pub date: DateTime<FixedOffset>,
    /// All To addresses followed by all CC addresses, not deduplicated.
    pub recipients: Vec<Address>,
    /// Exact byte length of the raw input.
    pub size: usize,
}

/// Parse the header block of a raw message.
pub fn parse_mail_message(raw: &[u8]) -> Result<ParsedMail, ParseError> {
    let size = raw.len();
    let headers = Headers::parse(raw);

    let subject = headers
        .first("subject")
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_SUBJECT)
        .to_owned();

    let from = headers
        .first("from")
        .ok_or(ParseError::MissingHeader { name: "From" })?;
    let sender = address_list(from)
        .into_iter()
        .next()
        .ok_or(ParseError::NoAddresses { name: "From" })?;

    let raw_date = headers
        .first("date")
        .ok_or(ParseError::MissingHeader { name: "Date" })?;
    let date = DateTime::parse_from_rfc2822(raw_date)
        .map_err(|e| ParseError::timestamp(raw_date, e))?;

    let mut recipients = Vec::new();
    for name in ["to", "cc"] {
        if let Some(value) = headers.first(name) {
            recipients.extend(address_list(value));
        }
    }

    Ok(ParsedMail {
        subject,
        sender,
        date,
        recipients,
        size,
    })
}

/// Unfolded header block. Names are lowercased; values are trimmed.
struct Headers(Vec<(String, String)>);

impl Headers {
    fn parse(raw: &[u8]) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();

        for line in raw.split(|&b| b == b'\n') {
            let line = line.strip_suffix(&[b'\r']).unwrap_or(line);
            if line.is_empty() {
                // Blank line ends the header block; the body is not parsed.
                break;
            }

            let text = String::from_utf8_lossy(line);
            if text.starts_with(' ') || text.starts_with('\t') {
                // Folded continuation of the previous header.
                if let Some((_, value)) = entries.last_mut() {
                    value.push(' ');
                    value.push_str(text.trim());
                }
                continue;
            }

            if let Some((name, value)) = text.split_once(':') {
                entries.push((name.trim().to_ascii_lowercase(), value.trim().to_owned()));
            }
        }

        Self(entries)
    }

    fn first(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

fn address_list(value: &str) -> Vec<Address> {
    split_unquoted_commas(value)
        .into_iter()
        .filter_map(parse_address)
        .collect()
}

/// Split on commas that are not inside a quoted display name.
fn split_unquoted_commas(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, ch) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

fn parse_address(part: &str) -> Option<Address> {
    let part = part.trim();
    if part.is_empty() {
        return None;
    }

    // "Display Name <addr@host>" form. rfind so a '<' inside a quoted
    // display name does not fool us.
    if let Some(lt) = part.rfind('<') {
        let rest = &part[lt + 1..];
        let gt = rest.find('>')?;
        let addr = rest[..gt].trim();
        if addr.is_empty() {
            return None;
        }
        return Some(Address {
            realname: unquote_display(part[..lt].trim()),
            addr: addr.to_owned(),
        });
    }

    // Bare addr-spec, or group syntax ("name: member;") whose label and
    // terminator are stripped.
    let bare = part.strip_suffix(';').unwrap_or(part);
    let bare = match bare.split_once(':') {
        Some((_, members)) => members.trim(),
        None => bare,
    };
    if bare.is_empty() {
        return None;
    }
    Some(Address {
        realname: String::new(),
        addr: bare.to_owned(),
    })
}

fn unquote_display(display: &str) -> String {
    let Some(stripped) = display
        .strip_prefix('"')
        .and_then(|d| d.strip_suffix('"'))
    else {
        return display.to_owned();
    };

    let mut out = String::with_capacity(stripped.len());
    let mut escaped = false;
    for ch in stripped.chars() {
        if escaped {
            out.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else {
            out.push(ch);
        }
    }
    out
}
