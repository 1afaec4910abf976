use std::fmt;

use chrono::{DateTime, Utc};

/// Classification of a discovery entry for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryCategory {
    /// Session lifecycle transitions.
    System,
    /// Web search findings.
    Web,
    /// Community (Reddit) findings.
    Community,
    /// Scraped page content.
    Content,
    /// Backend narration that fits no specific category.
    Pipeline,
}

impl fmt::Display for DiscoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiscoveryCategory::System => "system",
            DiscoveryCategory::Web => "web",
            DiscoveryCategory::Community => "community",
            DiscoveryCategory::Content => "content",
            DiscoveryCategory::Pipeline => "pipeline",
        };
        f.write_str(label)
    }
}

/// A human-readable log entry derived from the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub id: u64,
    pub category: DiscoveryCategory,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only, chronologically ordered narration log.
///
/// Entries are never merged or mutated; identical content may
/// legitimately repeat (two events reporting the same counter at
/// different times are two entries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryLog {
    entries: Vec<Discovery>,
    next_id: u64,
}

impl Default for DiscoveryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    pub fn append(&mut self, category: DiscoveryCategory, content: impl Into<String>) {
        self.entries.push(Discovery {
            id: self.next_id,
            category,
            content: content.into(),
            timestamp: Utc::now(),
        });
        self.next_id += 1;
    }

    /// Entries oldest-first.
    pub fn entries(&self) -> &[Discovery] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_preserve_order_and_ids() {
        let mut log = DiscoveryLog::new();
        log.append(DiscoveryCategory::System, "first");
        log.append(DiscoveryCategory::Web, "second");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content, "first");
        assert_eq!(entries[1].content, "second");
        assert!(entries[0].id < entries[1].id);
    }

    #[test]
    fn identical_content_is_not_deduplicated() {
        let mut log = DiscoveryLog::new();
        log.append(DiscoveryCategory::Web, "Found 5 web results");
        log.append(DiscoveryCategory::Web, "Found 5 web results");
        assert_eq!(log.len(), 2);
    }
}
