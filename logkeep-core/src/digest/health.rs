use crate::error::HealthError;
use nix::sys::statvfs::statvfs;
use nix::unistd::gethostname;
use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

/// Network device whose traffic counters appear in the digest.
const TRAFFIC_DEVICE: &str = "eth0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
}

impl DiskUsage {
    pub fn percent_used(&self) -> f64 {
        100.0 * self.used as f64 / self.total as f64
    }
}

/// Present when the host has flagged that a reboot is pending. The package
/// list may be empty when the marker exists but names no packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebootRequired {
    pub packages: Vec<String>,
}

/// Byte counters for one whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traffic {
    pub sent: u64,
    pub received: u64,
}

/// Everything the digest reads from the host. A trait so composition can be
/// exercised without touching the real machine.
pub trait HealthProbe {
    /// Names of nonempty files directly under `dir`, sorted.
    fn nonempty_error_logs(&self, dir: &Path) -> Result<Vec<String>, HealthError>;

    /// The three load-average figures, verbatim.
    fn load_average(&self) -> Result<[String; 3], HealthError>;

    fn disk_usage(&self) -> Result<DiskUsage, HealthError>;

    fn reboot_required(&self) -> Result<Option<RebootRequired>, HealthError>;

    fn traffic_yesterday(&self) -> Result<Traffic, HealthError>;

    fn mailbox_has_mail(&self, path: &Path) -> bool;

    /// The host's local mail destination domains, lowercased.
    fn local_domains(&self) -> Result<BTreeSet<String>, HealthError>;

    fn hostname(&self) -> Result<String, HealthError>;
}

/// The real host: procfs, statvfs and a couple of external commands.
pub struct SystemHealth;

impl HealthProbe for SystemHealth {
    fn nonempty_error_logs(&self, dir: &Path) -> Result<Vec<String>, HealthError> {
        let mut names = Vec::new();
        let entries = std::fs::read_dir(dir).map_err(|e| HealthError::read(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| HealthError::read(dir, e))?;
            let meta = entry
                .metadata()
                .map_err(|e| HealthError::read(entry.path(), e))?;
            if meta.len() > 0 {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn load_average(&self) -> Result<[String; 3], HealthError> {
        let raw = std::fs::read_to_string("/proc/loadavg")
            .map_err(|e| HealthError::read("/proc/loadavg", e))?;
        let mut fields = raw.split_whitespace().map(str::to_owned);
        match (fields.next(), fields.next(), fields.next()) {
            (Some(one), Some(five), Some(fifteen)) => Ok([one, five, fifteen]),
            _ => Err(HealthError::CommandOutput {
                command: "/proc/loadavg",
                detail: raw,
            }),
        }
    }

    fn disk_usage(&self) -> Result<DiskUsage, HealthError> {
        let stat = statvfs("/").map_err(|e| HealthError::Statvfs {
            path: "/".into(),
            source: e,
        })?;
        let frsize = stat.fragment_size() as u64;
        Ok(DiskUsage {
            total: stat.blocks() as u64 * frsize,
            used: (stat.blocks() as u64 - stat.blocks_free() as u64) * frsize,
        })
    }

    fn reboot_required(&self) -> Result<Option<RebootRequired>, HealthError> {
        if !Path::new("/var/run/reboot-required").exists() {
            return Ok(None);
        }
        // The marker may exist without the package list.
        let packages = match std::fs::read_to_string("/var/run/reboot-required.pkgs") {
            Ok(raw) => raw.lines().map(str::to_owned).collect(),
            Err(_) => Vec::new(),
        };
        Ok(Some(RebootRequired { packages }))
    }

    fn traffic_yesterday(&self) -> Result<Traffic, HealthError> {
        let stdout = run_command("vnstat", &["--json", "d", "2", "-i", TRAFFIC_DEVICE])?;
        let data: serde_json::Value =
            serde_json::from_str(&stdout).map_err(|e| HealthError::CommandOutput {
                command: "vnstat",
                detail: e.to_string(),
            })?;
        let yesterday = &data["interfaces"][0]["traffic"]["day"][0];
        match (yesterday["tx"].as_u64(), yesterday["rx"].as_u64()) {
            (Some(sent), Some(received)) => Ok(Traffic { sent, received }),
            _ => Err(HealthError::CommandOutput {
                command: "vnstat",
                detail: "missing day traffic counters".to_owned(),
            }),
        }
    }

    fn mailbox_has_mail(&self, path: &Path) -> bool {
        std::fs::metadata(path).is_ok_and(|meta| meta.len() > 0)
    }

    fn local_domains(&self) -> Result<BTreeSet<String>, HealthError> {
        let stdout = run_command("postconf", &["-hx", "mydestination"])?;
        Ok(stdout
            .trim()
            .to_lowercase()
            .split(", ")
            .map(str::to_owned)
            .collect())
    }

    fn hostname(&self) -> Result<String, HealthError> {
        let name = gethostname().map_err(HealthError::Hostname)?;
        Ok(name.to_string_lossy().into_owned())
    }
}

fn run_command(command: &'static str, args: &[&str]) -> Result<String, HealthError> {
    let output = Command::new(command)
        .args(args)
        .output()
        .map_err(|e| HealthError::Command { command, source: e })?;
    if !output.status.success() {
        return Err(HealthError::CommandStatus {
            command,
            status: output.status,
        });
    }
    String::from_utf8(output.stdout).map_err(|e| HealthError::CommandOutput {
        command,
        detail: e.to_string(),
    })
}
