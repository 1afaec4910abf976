use std::collections::BTreeMap;

/// Last-write-wins accumulator for the backend's named progress counters.
///
/// Each merge overwrites only the keys present in the partial update, so
/// two events touching disjoint keys both survive. The snapshot at any
/// time is the union of all keys ever sent, each holding the value from
/// its most recent update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressCounters {
    values: BTreeMap<String, u64>,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, partial: &BTreeMap<String, u64>) {
        for (key, value) in partial {
            self.values.insert(key.clone(), *value);
        }
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.values.clone()
    }
}
