//! Streaming ingestion: stdin -> parser -> store, one record at a time.
//!
//! Input is consumed incrementally so a live `tail -f` feed is persisted with
//! low per-record latency. Each successfully parsed record is inserted
//! immediately; there is no batching and no multi-record transaction. The
//! first parse or persistence failure aborts the whole run.

use crate::error::IngestError;
use crate::event::{parse_access_line, parse_authfail_line, parse_mail_message};
use crate::store::Store;
use chrono::Utc;
use serde::Serialize;
use std::io::{BufRead, Read, Write};

/// Why an ingestion run stopped, plus the input unit that caused it (absent
/// when the failure happened before a unit was read, e.g. an IO error).
#[derive(Debug)]
pub struct IngestFailure {
    pub error: IngestError,
    pub line: Option<String>,
}

impl IngestFailure {
    fn at(error: impl Into<IngestError>, line: &str) -> Self {
        Self {
            error: error.into(),
            line: Some(line.to_owned()),
        }
    }

    fn before_read(error: impl Into<IngestError>) -> Self {
        Self {
            error: error.into(),
            line: None,
        }
    }
}

/// Ingest `|`-delimited access-log lines until end of input.
pub fn ingest_access<R: BufRead>(store: &Store, input: R) -> Result<u64, IngestFailure> {
    let mut inserted = 0;
    for line in input.lines() {
        let line = line.map_err(IngestFailure::before_read)?;
        let event = parse_access_line(&line).map_err(|e| IngestFailure::at(e, &line))?;
        store
            .insert_access(&event)
            .map_err(|e| IngestFailure::at(e, &line))?;
        inserted += 1;
    }
    tracing::info!(inserted, "access ingestion finished");
    Ok(inserted)
}

/// Ingest sshd authentication-failure lines until end of input.
pub fn ingest_authfail<R: BufRead>(store: &Store, input: R) -> Result<u64, IngestFailure> {
    let mut inserted = 0;
    for line in input.lines() {
        let line = line.map_err(IngestFailure::before_read)?;
        let event = parse_authfail_line(&line).map_err(|e| IngestFailure::at(e, &line))?;
        store
            .insert_authfail(&event)
            .map_err(|e| IngestFailure::at(e, &line))?;
        inserted += 1;
    }
    tracing::info!(inserted, "authfail ingestion finished");
    Ok(inserted)
}

/// Ingest one delivered message: the entire remaining input is the unit.
pub fn ingest_mail<R: Read>(store: &Store, mut input: R) -> Result<(), IngestFailure> {
    let mut raw = Vec::new();
    input
        .read_to_end(&mut raw)
        .map_err(IngestFailure::before_read)?;

    let parsed = parse_mail_message(&raw).map_err(IngestFailure::before_read)?;
    store
        .insert_mail(Utc::now(), &parsed)
        .map_err(IngestFailure::before_read)?;

    tracing::info!(size = parsed.size, "mail ingestion finished");
    Ok(())
}

/// The one structured record written to the error channel when a run dies.
#[derive(Debug, Serialize)]
pub struct Diagnostic {
    pub time: String,
    pub line: String,
    pub traceback: String,
    pub error_type: String,
    pub error: String,
}

impl Diagnostic {
    pub fn from_failure(failure: &IngestFailure) -> Self {
        Self {
            time: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            line: failure.line.clone().unwrap_or_default(),
            traceback: render_chain(&failure.error),
            error_type: failure.error.kind().to_owned(),
            error: failure.error.to_string(),
        }
    }

    /// Write the record as a single JSON line.
    pub fn emit<W: Write>(&self, mut out: W) {
        if let Ok(json) = serde_json::to_string(self) {
            let _ = writeln!(out, "{json}");
            let _ = out.flush();
        }
    }
}

/// Flatten an error and its source chain into one readable string.
fn render_chain(error: &dyn std::error::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str("\ncaused by: ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
