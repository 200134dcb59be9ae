use crate::event::{AccessEvent, Address, AuthFailEvent, ParsedMail};
use crate::store::{SUBJECT_MAX, Store};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use pretty_assertions::assert_eq;

fn hours_ago(hours: i64) -> DateTime<FixedOffset> {
    (Utc::now() - Duration::hours(hours)).fixed_offset()
}

fn access(reqline: &str, timestamp: DateTime<FixedOffset>) -> AccessEvent {
    AccessEvent {
        timestamp,
        host: "example.com".to_owned(),
        port: 443,
        src_addr: "203.0.113.5".to_owned(),
        authuser: "-".to_owned(),
        bytes_in: 100,
        bytes_out: 2000,
        micros: 1500,
        status: 200,
        reqline: reqline.to_owned(),
        method: "GET".to_owned(),
        path: "/".to_owned(),
        protocol: "HTTP/1.1".to_owned(),
        referer: "-".to_owned(),
        user_agent: "test".to_owned(),
    }
}

fn authfail(src_addr: &str, timestamp: DateTime<FixedOffset>) -> AuthFailEvent {
    AuthFailEvent {
        timestamp,
        username: "root".to_owned(),
        src_addr: src_addr.to_owned(),
    }
}

fn address(realname: &str, addr: &str) -> Address {
    Address {
        realname: realname.to_owned(),
        addr: addr.to_owned(),
    }
}

fn mail(sender: Address, recipients: Vec<Address>) -> ParsedMail {
    ParsedMail {
        subject: "hi".to_owned(),
        sender,
        date: hours_ago(1),
        recipients,
        size: 512,
    }
}

#[test]
fn find_or_create_contact_is_idempotent() {
    // Arrange
    let store = Store::open_in_memory().unwrap();

    // Act
    let first = store.find_or_create_contact("Alice Archer", "alice@example.com").unwrap();
    let second = store.find_or_create_contact("Alice Archer", "alice@example.com").unwrap();

    // Assert
    assert_eq!(first.id, second.id);
    assert_eq!(store.count("contacts"), 1);
}

#[test]
fn contacts_with_different_realnames_are_distinct() {
    // Arrange
    let store = Store::open_in_memory().unwrap();

    // Act
    let first = store.find_or_create_contact("Alice", "alice@example.com").unwrap();
    let second = store.find_or_create_contact("Alice Archer", "alice@example.com").unwrap();

    // Assert
    assert_ne!(first.id, second.id);
    assert_eq!(store.count("contacts"), 2);
}

#[test]
fn two_mails_from_same_sender_share_one_contact() {
    // Arrange
    let store = Store::open_in_memory().unwrap();
    let sender = address("Alice", "alice@example.com");

    // Act
    store.insert_mail(Utc::now(), &mail(sender.clone(), vec![])).unwrap();
    store.insert_mail(Utc::now(), &mail(sender, vec![])).unwrap();

    // Assert
    assert_eq!(store.count("contacts"), 1);
    let records = store.mail_since(Utc::now() - Duration::days(1)).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].sender.id, records[1].sender.id);
}

#[test]
fn recipients_are_deduplicated_by_contact_identity() {
    // Arrange
    let store = Store::open_in_memory().unwrap();
    let bob = address("Bob", "bob@example.com");
    let parsed = mail(
        address("Alice", "alice@example.com"),
        vec![bob.clone(), bob, address("", "carol@example.net")],
    );

    // Act
    store.insert_mail(Utc::now(), &parsed).unwrap();

    // Assert
    let records = store.mail_since(Utc::now() - Duration::days(1)).unwrap();
    assert_eq!(records[0].recipients.len(), 2);
}

#[test]
fn subject_is_truncated_when_stored() {
    // Arrange
    let store = Store::open_in_memory().unwrap();
    let mut parsed = mail(address("Alice", "alice@example.com"), vec![]);
    parsed.subject = "x".repeat(SUBJECT_MAX + 100);

    // Act
    store.insert_mail(Utc::now(), &parsed).unwrap();

    // Assert
    let records = store.mail_since(Utc::now() - Duration::days(1)).unwrap();
    assert_eq!(records[0].subject.len(), SUBJECT_MAX);
}

#[test]
fn access_summary_orders_by_count_then_reqline() {
    // Arrange: counts {A: 3, B: 5, C: 5} with B < C lexicographically.
    let store = Store::open_in_memory().unwrap();
    for _ in 0..3 {
        store.insert_access(&access("GET /a HTTP/1.1", hours_ago(1))).unwrap();
    }
    for _ in 0..5 {
        store.insert_access(&access("GET /b HTTP/1.1", hours_ago(1))).unwrap();
    }
    for _ in 0..5 {
        store.insert_access(&access("GET /c HTTP/1.1", hours_ago(1))).unwrap();
    }

    // Act
    let groups = store.access_summary(Utc::now() - Duration::days(1)).unwrap();

    // Assert
    let order: Vec<(i64, &str)> = groups.iter().map(|g| (g.hits, g.reqline.as_str())).collect();
    assert_eq!(
        order,
        vec![
            (5, "GET /b HTTP/1.1"),
            (5, "GET /c HTTP/1.1"),
            (3, "GET /a HTTP/1.1"),
        ]
    );
}

#[test]
fn access_summary_sums_bytes_per_group() {
    // Arrange
    let store = Store::open_in_memory().unwrap();
    store.insert_access(&access("GET / HTTP/1.1", hours_ago(1))).unwrap();
    store.insert_access(&access("GET / HTTP/1.1", hours_ago(2))).unwrap();

    // Act
    let groups = store.access_summary(Utc::now() - Duration::days(1)).unwrap();

    // Assert
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].bytes_in, 200);
    assert_eq!(groups[0].bytes_out, 4000);
}

#[test]
fn access_summary_ignores_events_outside_the_window() {
    // Arrange
    let store = Store::open_in_memory().unwrap();
    store.insert_access(&access("GET /old HTTP/1.1", hours_ago(25))).unwrap();
    store.insert_access(&access("GET /new HTTP/1.1", hours_ago(1))).unwrap();

    // Act
    let groups = store.access_summary(Utc::now() - Duration::days(1)).unwrap();

    // Assert
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].reqline, "GET /new HTTP/1.1");
}

#[test]
fn authfail_summary_orders_by_count_then_address() {
    // Arrange
    let store = Store::open_in_memory().unwrap();
    for _ in 0..2 {
        store.insert_authfail(&authfail("198.51.100.7", hours_ago(1))).unwrap();
    }
    for _ in 0..2 {
        store.insert_authfail(&authfail("198.51.100.2", hours_ago(1))).unwrap();
    }
    store.insert_authfail(&authfail("203.0.113.9", hours_ago(1))).unwrap();

    // Act
    let groups = store.authfail_summary(Utc::now() - Duration::days(1)).unwrap();

    // Assert
    let order: Vec<(i64, &str)> = groups
        .iter()
        .map(|g| (g.attempts, g.src_addr.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![(2, "198.51.100.2"), (2, "198.51.100.7"), (1, "203.0.113.9")]
    );
}

#[test]
fn mail_since_orders_by_timestamp_then_id() {
    // Arrange
    let store = Store::open_in_memory().unwrap();
    let sender = address("Alice", "alice@example.com");
    let early = Utc::now() - Duration::hours(3);
    let late = Utc::now() - Duration::hours(1);

    let mut a = mail(sender.clone(), vec![]);
    a.subject = "late".to_owned();
    store.insert_mail(late, &a).unwrap();

    let mut b = mail(sender.clone(), vec![]);
    b.subject = "early".to_owned();
    store.insert_mail(early, &b).unwrap();

    // Same timestamp as "late" but inserted afterwards.
    let mut c = mail(sender, vec![]);
    c.subject = "late-second".to_owned();
    store.insert_mail(late, &c).unwrap();

    // Act
    let records = store.mail_since(Utc::now() - Duration::days(1)).unwrap();

    // Assert
    let subjects: Vec<&str> = records.iter().map(|m| m.subject.as_str()).collect();
    assert_eq!(subjects, vec!["early", "late", "late-second"]);
}
