use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// e.g. "/var/lib/logkeep/logkeep.sqlite"
    pub path: PathBuf,
}

/// Which report sections the digest includes. Everything defaults to off so a
/// host only reports on streams it actually ingests.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Features {
    pub access: bool,
    pub authfail: bool,
    pub maillog: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DigestConfig {
    /// Address the composed digest message is addressed to.
    pub recipient: String,

    /// Local mailbox whose non-emptiness raises the MAIL tag.
    pub mailbox: PathBuf,

    /// Directory of error logs; any non-empty file raises the LOGERR tag.
    pub logs_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub database: DatabaseConfig,

    #[serde(default)]
    pub features: Features,

    pub digest: DigestConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
