use std::collections::HashMap;

use crate::models::CatalogRecord;

/// Title → row lookup; the first record carrying a title owns it
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    rows: HashMap<String, usize>,
}

impl TitleIndex {
    pub fn build(records: &[CatalogRecord]) -> Self {
        let mut rows = HashMap::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            rows.entry(record.title.clone()).or_insert(row);
        }
        Self { rows }
    }

    /// Exact, case-sensitive lookup
    pub fn lookup(&self, title: &str) -> Option<usize> {
        self.rows.get(title).copied()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.rows.contains_key(title)
    }

    /// Number of distinct titles
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
