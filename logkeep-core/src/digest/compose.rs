use crate::config::Config;
use crate::digest::health::HealthProbe;
use crate::digest::tags::TagSet;
use crate::error::DigestError;
use crate::report::{self, iso8601_z, longint};
use crate::store::Store;
use chrono::Utc;
use std::fmt::Write;

/// Root-partition usage at or above this percentage raises the DISK tag.
const DISK_THRESHOLD_PCT: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub body: String,
}

/// Run every health check and report, fold the results into one digest.
/// Fragment order is fixed; a failing collaborator aborts the whole digest.
pub fn compose_digest(
    store: &Store,
    cfg: &Config,
    health: &dyn HealthProbe,
) -> Result<Digest, DigestError> {
    let now = Utc::now();
    let since = report::window_start(now);
    let mut tags = TagSet::new();
    let mut fragments: Vec<Option<String>> = Vec::new();

    if health.mailbox_has_mail(&cfg.digest.mailbox) {
        tags.add("MAIL");
    }

    fragments.push(errlog_fragment(cfg, health, &mut tags)?);
    fragments.push(reboot_fragment(health, &mut tags)?);
    fragments.push(Some(load_fragment(health)?));
    fragments.push(Some(disk_fragment(health, &mut tags)?));
    fragments.push(Some(traffic_fragment(health)?));
    if cfg.features.maillog {
        let domains = health.local_domains()?;
        let records = store.mail_since(since)?;
        fragments.push(Some(report::mail::render(&records, &domains)));
    }
    if cfg.features.authfail {
        fragments.push(Some(report::authfail::render(
            &store.authfail_summary(since)?,
        )));
    }
    if cfg.features.access {
        fragments.push(Some(report::access::render(&store.access_summary(since)?)));
    }

    let body = join_fragments(&fragments);
    let subject = format!(
        "{}Status Report: {}, {}",
        tags.subject_prefix(),
        health.hostname()?,
        iso8601_z(now),
    );
    tracing::info!(subject = %subject, "digest composed");
    Ok(Digest { subject, body })
}

/// Concatenate the present, non-empty fragments with a blank line between
/// them (each fragment already ends in a newline of its own).
pub(crate) fn join_fragments(fragments: &[Option<String>]) -> String {
    let body = fragments
        .iter()
        .filter_map(|f| f.as_deref())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if body.is_empty() {
        "Nothing to report\n".to_owned()
    } else {
        body
    }
}

fn errlog_fragment(
    cfg: &Config,
    health: &dyn HealthProbe,
    tags: &mut TagSet,
) -> Result<Option<String>, DigestError> {
    let names = health.nonempty_error_logs(&cfg.digest.logs_dir)?;
    if names.is_empty() {
        return Ok(None);
    }
    tags.add("LOGERR");
    let mut fragment = format!(
        "The following files in {} are nonempty:\n",
        cfg.digest.logs_dir.display()
    );
    for name in names {
        let _ = writeln!(fragment, "    {name}");
    }
    Ok(Some(fragment))
}

fn reboot_fragment(
    health: &dyn HealthProbe,
    tags: &mut TagSet,
) -> Result<Option<String>, DigestError> {
    let Some(reboot) = health.reboot_required()? else {
        return Ok(None);
    };
    tags.add("REBOOT");
    let mut fragment = "Reboot required by the following packages:".to_owned();
    if reboot.packages.is_empty() {
        fragment.push_str(" UNKNOWN\n");
    } else {
        fragment.push('\n');
        for package in &reboot.packages {
            let _ = writeln!(fragment, "    {package}");
        }
    }
    Ok(Some(fragment))
}

fn load_fragment(health: &dyn HealthProbe) -> Result<String, DigestError> {
    let [one, five, fifteen] = health.load_average()?;
    Ok(format!("Load: {one}, {five}, {fifteen}\n"))
}

fn disk_fragment(health: &dyn HealthProbe, tags: &mut TagSet) -> Result<String, DigestError> {
    let usage = health.disk_usage()?;
    let used = longint(usage.used);
    let total = longint(usage.total);
    let width = used.len().max(total.len());
    let pct = usage.percent_used();
    if pct >= DISK_THRESHOLD_PCT {
        tags.add("DISK");
    }
    Ok(format!(
        "Space used on root partition:\n    {used:>width$}\n  / {total:>width$}\n   ({pct:.6}%)\n"
    ))
}

fn traffic_fragment(health: &dyn HealthProbe) -> Result<String, DigestError> {
    let traffic = health.traffic_yesterday()?;
    let sent = longint(traffic.sent);
    let received = longint(traffic.received);
    let width = sent.len().max(received.len());
    Ok(format!(
        "Data sent yesterday:     {sent:>width$} B\n\
         Data received yesterday: {received:>width$} B\n"
    ))
}
