//! SQLite-backed event store.
//!
//! One `Store` handle is constructed per invocation and passed by reference
//! to whichever component needs it; there is no ambient connection. Events
//! are append-only: the schema has insert and read paths only.

mod schema;

#[cfg(test)]
mod tests;

use crate::error::StoreError;
use crate::event::{AccessEvent, AuthFailEvent, ParsedMail};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::collections::HashSet;
use std::path::Path;

/// Stored subjects are truncated to this many characters.
pub const SUBJECT_MAX: usize = 2048;

pub struct Store {
    conn: Connection,
}

/// A persisted (realname, address) pair. Identity is the row id; the pair
/// itself is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: i64,
    pub realname: String,
    pub addr: String,
}

/// One group from the access-report query: a request line with its hit count
/// and byte totals over the window.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessGroup {
    pub reqline: String,
    pub hits: i64,
    pub bytes_in: i64,
    pub bytes_out: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthFailGroup {
    pub src_addr: String,
    pub attempts: i64,
}

/// One stored mail event with its (deduplicated) recipient contacts.
#[derive(Debug, Clone, PartialEq)]
pub struct MailRecord {
    pub id: i64,
    /// Ingestion time, epoch seconds.
    pub timestamp: i64,
    pub subject: String,
    pub sender: Contact,
    pub size: i64,
    /// Message Date header, epoch seconds.
    pub date: i64,
    pub recipients: Vec<Contact>,
}

impl Store {
    /// Open or create the database at `path` and apply the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_connection(conn)
    }

    /// In-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn insert_access(&self, event: &AccessEvent) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO access_events (timestamp, host, port, src_addr, authuser,
                 bytes_in, bytes_out, micros, status, reqline, method, path,
                 protocol, referer, user_agent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                event.timestamp.timestamp(),
                event.host,
                event.port,
                event.src_addr,
                event.authuser,
                event.bytes_in,
                event.bytes_out,
                event.micros,
                event.status,
                event.reqline,
                event.method,
                event.path,
                event.protocol,
                event.referer,
                event.user_agent,
            ],
        )?;
        Ok(())
    }

    pub fn insert_authfail(&self, event: &AuthFailEvent) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO authfail_events (timestamp, username, src_addr)
             VALUES (?1, ?2, ?3)",
            params![event.timestamp.timestamp(), event.username, event.src_addr],
        )?;
        Ok(())
    }

    /// Look a contact up by its (realname, address) pair, creating it if it
    /// does not exist yet.
    pub fn find_or_create_contact(
        &self,
        realname: &str,
        addr: &str,
    ) -> Result<Contact, StoreError> {
        let existing = self
            .conn
            .query_row(
                "SELECT id FROM contacts WHERE realname = ?1 AND email_address = ?2",
                params![realname, addr],
                |r| r.get::<_, i64>(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        let id = match existing {
            Some(id) => id,
            None => {
                self.conn.execute(
                    "INSERT INTO contacts (realname, email_address) VALUES (?1, ?2)",
                    params![realname, addr],
                )?;
                self.conn.last_insert_rowid()
            }
        };

        Ok(Contact {
            id,
            realname: realname.to_owned(),
            addr: addr.to_owned(),
        })
    }

    /// Persist one parsed message. Finds-or-creates the sender contact and
    /// each recipient contact, deduplicating recipients by contact identity.
    pub fn insert_mail(
        &self,
        timestamp: DateTime<Utc>,
        mail: &ParsedMail,
    ) -> Result<i64, StoreError> {
        let sender = self.find_or_create_contact(&mail.sender.realname, &mail.sender.addr)?;
        let subject: String = mail.subject.chars().take(SUBJECT_MAX).collect();

        self.conn.execute(
            "INSERT INTO mail_events (timestamp, subject, sender_id, size, date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                timestamp.timestamp(),
                subject,
                sender.id,
                mail.size as i64,
                mail.date.timestamp(),
            ],
        )?;
        let msg_id = self.conn.last_insert_rowid();

        let mut seen = HashSet::new();
        for recipient in &mail.recipients {
            let contact = self.find_or_create_contact(&recipient.realname, &recipient.addr)?;
            if seen.insert(contact.id) {
                self.conn.execute(
                    "INSERT INTO mail_recipients (msg_id, contact_id) VALUES (?1, ?2)",
                    params![msg_id, contact.id],
                )?;
            }
        }

        Ok(msg_id)
    }

    /// Access events since `since` (inclusive), grouped by request line,
    /// ordered by hit count descending then request line ascending.
    pub fn access_summary(&self, since: DateTime<Utc>) -> Result<Vec<AccessGroup>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT reqline, COUNT(*) AS hits, SUM(bytes_in), SUM(bytes_out)
             FROM access_events
             WHERE timestamp >= ?1
             GROUP BY reqline
             ORDER BY hits DESC, reqline ASC",
        )?;
        let rows = stmt
            .query_map(params![since.timestamp()], |r| {
                Ok(AccessGroup {
                    reqline: r.get(0)?,
                    hits: r.get(1)?,
                    bytes_in: r.get(2)?,
                    bytes_out: r.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Auth failures since `since` (inclusive), grouped by source address,
    /// ordered by attempt count descending then address ascending.
    pub fn authfail_summary(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<AuthFailGroup>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT src_addr, COUNT(*) AS attempts
             FROM authfail_events
             WHERE timestamp >= ?1
             GROUP BY src_addr
             ORDER BY attempts DESC, src_addr ASC",
        )?;
        let rows = stmt
            .query_map(params![since.timestamp()], |r| {
                Ok(AuthFailGroup {
                    src_addr: r.get(0)?,
                    attempts: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Mail events since `since` (inclusive), ordered by ingestion timestamp
    /// ascending then insertion id ascending, with their recipients attached.
    pub fn mail_since(&self, since: DateTime<Utc>) -> Result<Vec<MailRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT m.id, m.timestamp, m.subject, m.size, m.date,
                    c.id, c.realname, c.email_address
             FROM mail_events m
             JOIN contacts c ON c.id = m.sender_id
             WHERE m.timestamp >= ?1
             ORDER BY m.timestamp ASC, m.id ASC",
        )?;
        let mut records = stmt
            .query_map(params![since.timestamp()], |r| {
                Ok(MailRecord {
                    id: r.get(0)?,
                    timestamp: r.get(1)?,
                    subject: r.get(2)?,
                    size: r.get(3)?,
                    date: r.get(4)?,
                    sender: Contact {
                        id: r.get(5)?,
                        realname: r.get(6)?,
                        addr: r.get(7)?,
                    },
                    recipients: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for record in &mut records {
            record.recipients = self.recipients_of(record.id)?;
        }
        Ok(records)
    }

    fn recipients_of(&self, msg_id: i64) -> Result<Vec<Contact>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.realname, c.email_address
             FROM mail_recipients r
             JOIN contacts c ON c.id = r.contact_id
             WHERE r.msg_id = ?1",
        )?;
        let rows = stmt
            .query_map(params![msg_id], |r| {
                Ok(Contact {
                    id: r.get(0)?,
                    realname: r.get(1)?,
                    addr: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    #[cfg(test)]
    pub(crate) fn count(&self, table: &str) -> i64 {
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }
}
