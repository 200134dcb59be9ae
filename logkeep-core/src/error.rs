use std::path::PathBuf;
use thiserror::Error;

/// A malformed input unit. Any of these is fatal for the current run: the
/// stream processor never skips a record it could not understand.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected {expected} '|'-delimited fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("quoted-string array is not parseable: {0}")]
    ArrayLiteral(#[source] serde_json::Error),

    #[error("quoted-string array has {found} elements, expected {expected}")]
    ArrayLen { expected: usize, found: usize },

    #[error("field {field} is not a valid integer: {value:?}")]
    InvalidInt { field: &'static str, value: String },

    #[error("invalid timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("string cannot be re-encoded from latin-1 to utf-8: {value:?}")]
    Reencode { value: String },

    #[error("could not parse logfile entry")]
    NoMatch,

    #[error("missing required header {name}")]
    MissingHeader { name: &'static str },

    #[error("{name} header contains no addresses")]
    NoAddresses { name: &'static str },
}

impl ParseError {
    pub fn invalid_int(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidInt {
            field,
            value: value.into(),
        }
    }

    pub fn timestamp(value: impl Into<String>, source: chrono::ParseError) -> Self {
        Self::Timestamp {
            value: value.into(),
            source,
        }
    }
}

/// Event store collaborator failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Health-reading collaborator failure during digest generation.
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run {command}: {source}")]
    Command {
        command: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}")]
    CommandStatus {
        command: &'static str,
        status: std::process::ExitStatus,
    },

    #[error("unexpected {command} output: {detail}")]
    CommandOutput {
        command: &'static str,
        detail: String,
    },

    #[error("statvfs on {path}: {source}")]
    Statvfs {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },

    #[error("could not determine hostname: {0}")]
    Hostname(#[source] nix::Error),
}

impl HealthError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

/// Anything that aborts a streaming-ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Short category code for the diagnostic record.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "ParseError",
            Self::Store(_) => "StoreError",
            Self::Io(_) => "IoError",
        }
    }
}

/// Anything that aborts digest generation. No partial digest is emitted.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error(transparent)]
    Health(#[from] HealthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
