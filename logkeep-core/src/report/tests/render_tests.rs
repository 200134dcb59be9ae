use crate::report::mail::format_contact;
use crate::report::{access, authfail, mail};
use crate::store::{AccessGroup, AuthFailGroup, Contact, MailRecord};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn contact(id: i64, realname: &str, addr: &str) -> Contact {
    Contact {
        id,
        realname: realname.to_owned(),
        addr: addr.to_owned(),
    }
}

#[test]
fn access_report_lists_groups_and_byte_totals() {
    // Arrange
    let groups = vec![AccessGroup {
        reqline: "GET / HTTP/1.1".to_owned(),
        hits: 2,
        bytes_in: 100,
        bytes_out: 2000,
    }];

    // Act
    let rendered = access::render(&groups);

    // Assert: totals are right-aligned to the wider formatted value.
    assert_eq!(
        rendered,
        "Website activity in the past 24 hours:\n\
         +------+----------------+\n\
         | Hits | Request        |\n\
         +------+----------------+\n\
         |    2 | GET / HTTP/1.1 |\n\
         +------+----------------+\n\
         Total bytes sent:     2 000\n\
         Total bytes received:   100\n"
    );
}

#[test]
fn authfail_report_lists_attempts_per_address() {
    // Arrange
    let groups = vec![
        AuthFailGroup {
            src_addr: "198.51.100.2".to_owned(),
            attempts: 12,
        },
        AuthFailGroup {
            src_addr: "203.0.113.9".to_owned(),
            attempts: 1,
        },
    ];

    // Act
    let rendered = authfail::render(&groups);

    // Assert
    assert_eq!(
        rendered,
        "Failed SSH login attempts in the past 24 hours:\n\
         +----------+--------------+\n\
         | Attempts | IP Address   |\n\
         +----------+--------------+\n\
         |       12 | 198.51.100.2 |\n\
         |        1 | 203.0.113.9  |\n\
         +----------+--------------+\n"
    );
}

#[test]
fn empty_mail_report_is_a_single_none_line() {
    // Act
    let rendered = mail::render(&[], &BTreeSet::new());

    // Assert
    assert_eq!(rendered, "E-mails received in the past 24 hours: none\n");
}

#[test]
fn mail_report_filters_recipients_to_local_domains_and_sorts_them() {
    // Arrange
    let date = Utc.with_ymd_and_hms(2024, 5, 4, 6, 7, 8).unwrap();
    let record = MailRecord {
        id: 1,
        timestamp: date.timestamp(),
        subject: "hi".to_owned(),
        sender: contact(1, "Alice Archer", "alice@example.com"),
        size: 512,
        date: date.timestamp(),
        recipients: vec![
            contact(2, "", "zed@local.test"),
            contact(3, "", "bob@local.test"),
            contact(4, "", "carol@example.net"),
        ],
    };
    let domains = BTreeSet::from(["local.test".to_owned()]);

    // Act
    let rendered = mail::render(&[record], &domains);

    // Assert: carol's domain is not local, the rest sort by address.
    assert_eq!(
        rendered,
        "E-mails received in the past 24 hours:\n\
         ---\n\
         From:    Alice Archer <alice@example.com>\n\
         To:      bob@local.test, zed@local.test\n\
         Subject: hi\n\
         Date:    2024-05-04T06:07:08Z\n\
         Size:    512\n\
         ---\n"
    );
}

#[test]
fn recipient_domain_match_is_case_insensitive() {
    // Arrange
    let date = Utc.with_ymd_and_hms(2024, 5, 4, 6, 7, 8).unwrap();
    let record = MailRecord {
        id: 1,
        timestamp: date.timestamp(),
        subject: "hi".to_owned(),
        sender: contact(1, "", "alice@example.com"),
        size: 256,
        date: date.timestamp(),
        recipients: vec![contact(2, "", "bob@LOCAL.TEST")],
    };
    let domains = BTreeSet::from(["local.test".to_owned()]);

    // Act
    let rendered = mail::render(&[record], &domains);

    // Assert
    assert!(rendered.contains("To:      bob@LOCAL.TEST\n"));
}

#[test]
fn contact_with_no_display_name_renders_as_bare_address() {
    assert_eq!(
        format_contact(&contact(1, "", "bob@example.com")),
        "bob@example.com"
    );
}

#[test]
fn display_name_with_specials_is_quoted_and_escaped() {
    assert_eq!(
        format_contact(&contact(1, "Doe, J. \"Q\"", "j@example.com")),
        "\"Doe, J. \\\"Q\\\"\" <j@example.com>"
    );
    assert_eq!(
        format_contact(&contact(1, "Alice Archer", "alice@example.com")),
        "Alice Archer <alice@example.com>"
    );
}
