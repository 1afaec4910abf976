use std::collections::HashMap;

use crate::event::SourceRecord;

/// Deduplicating accumulator of discovered sources.
///
/// Identity is the source URL. Later records win on `title` and `type`,
/// but a source never moves from its first-seen position and is never
/// dropped; the backend resends growing snapshots and already-surfaced
/// sources must stay where the reader first saw them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceRegistry {
    records: Vec<SourceRecord>,
    by_url: HashMap<String, usize>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, incoming: &[SourceRecord]) {
        for record in incoming {
            match self.by_url.get(&record.url) {
                Some(&position) => {
                    self.records[position] = record.clone();
                }
                None => {
                    self.by_url.insert(record.url.clone(), self.records.len());
                    self.records.push(record.clone());
                }
            }
        }
    }

    /// Records in first-seen order.
    pub fn records(&self) -> &[SourceRecord] {
        &self.records
    }

    pub fn contains(&self, url: &str) -> bool {
        self.by_url.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
