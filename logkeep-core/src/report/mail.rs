use crate::report::format::iso8601_z;
use crate::store::{Contact, MailRecord};
use chrono::DateTime;
use std::collections::BTreeSet;
use std::fmt::Write;

const TITLE: &str = "E-mails received in the past 24 hours:";

/// Render the inbox fragment. Recipients are narrowed to addresses whose
/// domain is one of the host's local destination domains, so the reader sees
/// which of their own addresses each message went to.
pub fn render(records: &[MailRecord], local_domains: &BTreeSet<String>) -> String {
    if records.is_empty() {
        return format!("{TITLE} none\n");
    }

    let mut out = format!("{TITLE}\n---\n");
    for record in records {
        let mut recipients: Vec<&Contact> = record
            .recipients
            .iter()
            .filter(|c| {
                c.addr
                    .split_once('@')
                    .is_some_and(|(_, domain)| local_domains.contains(&domain.to_ascii_lowercase()))
            })
            .collect();
        recipients.sort_by(|a, b| (&a.realname, &a.addr).cmp(&(&b.realname, &b.addr)));
        let to = recipients
            .iter()
            .map(|c| format_contact(c))
            .collect::<Vec<_>>()
            .join(", ");

        let date = DateTime::from_timestamp(record.date, 0).unwrap_or_default();
        let _ = write!(
            out,
            "From:    {}\n\
             To:      {to}\n\
             Subject: {}\n\
             Date:    {}\n\
             Size:    {}\n\
             ---\n",
            format_contact(&record.sender),
            record.subject,
            iso8601_z(date),
            record.size,
        );
    }
    out
}

/// Render a contact as `Display Name <addr>`, quoting the display name when
/// it contains characters that are not safe in an unquoted phrase. A contact
/// with no display name renders as the bare address.
pub fn format_contact(contact: &Contact) -> String {
    if contact.realname.is_empty() {
        return contact.addr.clone();
    }
    let name = if needs_quoting(&contact.realname) {
        let escaped: String = contact
            .realname
            .chars()
            .flat_map(|c| {
                if c == '"' || c == '\\' {
                    vec!['\\', c]
                } else {
                    vec![c]
                }
            })
            .collect();
        format!("\"{escaped}\"")
    } else {
        contact.realname.clone()
    };
    format!("{name} <{}>", contact.addr)
}

fn needs_quoting(name: &str) -> bool {
    name.chars()
        .any(|c| matches!(c, '(' | ')' | '<' | '>' | '[' | ']' | ':' | ';' | '@' | '\\' | ',' | '.' | '"'))
}
