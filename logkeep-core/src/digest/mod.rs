//! Daily status digest: health checks plus the windowed activity reports,
//! folded into one subject-tagged plain-text message.

mod compose;
mod health;
mod tags;


pub use compose::{Digest, compose_digest};
pub use health::{DiskUsage, HealthProbe, RebootRequired, SystemHealth, Traffic};
pub use tags::{TAG_PRIORITY, TagSet};

/// Render for an interactive viewer: a pseudo-message with just the subject,
/// trimmed of trailing newlines so a pager does not show a blank tail.
pub fn render_interactive(digest: &Digest) -> String {
    format!("Subject: {}\n\n{}", digest.subject, digest.body)
        .trim_end_matches('\n')
        .to_owned()
}

/// Render as a complete message ready to hand to a mail submission program.
pub fn render_message(digest: &Digest, recipient: &str) -> String {
    format!(
        "Subject: {}\n\
         To: {recipient}\n\
         Content-Type: text/plain; charset=\"utf-8\"\n\
         MIME-Version: 1.0\n\
         \n\
         {}",
        digest.subject, digest.body
    )
}
