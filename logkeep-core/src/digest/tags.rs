use std::collections::BTreeSet;

/// Subject tags with a fixed precedence; anything else sorts after these.
pub const TAG_PRIORITY: [&str; 4] = ["DISK", "LOGERR", "REBOOT", "MAIL"];

/// The set of condition tags accumulated while composing a digest.
#[derive(Debug, Default)]
pub struct TagSet {
    tags: BTreeSet<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tag: &str) {
        self.tags.insert(tag.to_owned());
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Render the `[TAG] ` prefix for the digest subject: priority tags in
    /// their fixed order first, then any remaining tags lexicographically.
    pub fn subject_prefix(&self) -> String {
        let mut remaining = self.tags.clone();
        let mut prefix = String::new();
        for tag in TAG_PRIORITY {
            if remaining.remove(tag) {
                prefix.push_str(&format!("[{tag}] "));
            }
        }
        for tag in remaining {
            prefix.push_str(&format!("[{tag}] "));
        }
        prefix
    }
}
