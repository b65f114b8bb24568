use std::collections::HashMap;

use crate::food_record::{normalize_name, FoodRecord};

/// In-memory food table with exact name and alias indexes.
///
/// Built once and only read afterwards, so a single instance can be shared by
/// reference across threads. Canonical names always take precedence over
/// aliases; within each index the first record in table order wins.
#[derive(Debug, Default)]
pub struct FoodLookup {
    records: Vec<FoodRecord>,
    by_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl FoodLookup {
    pub fn new(records: Vec<FoodRecord>) -> Self {
        let mut by_name = HashMap::with_capacity(records.len());
        let mut by_alias = HashMap::new();

        for (idx, record) in records.iter().enumerate() {
            by_name.entry(normalize_name(&record.name)).or_insert(idx);
            for alias in &record.aliases {
                by_alias.entry(normalize_name(alias)).or_insert(idx);
            }
        }

        Self { records, by_name, by_alias }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolves a free-text name to exactly one record, or none. Matching is
    /// exact after trimming and lowercasing.
    pub fn find(&self, name: &str) -> Option<&FoodRecord> {
        let key = normalize_name(name);
        self.by_name
            .get(&key)
            .or_else(|| self.by_alias.get(&key))
            .map(|&idx| &self.records[idx])
    }

    /// Substring listing: name matches first, then records matched only through
    /// an alias. Unbounded; callers truncate for display.
    pub fn search(&self, query: &str) -> Vec<&FoodRecord> {
        let query = normalize_name(query);
        let mut matched = vec![false; self.records.len()];
        let mut results = Vec::new();

        for (idx, record) in self.records.iter().enumerate() {
            if normalize_name(&record.name).contains(&query) {
                matched[idx] = true;
                results.push(record);
            }
        }
        for (idx, record) in self.records.iter().enumerate() {
            if !matched[idx] && record.aliases.iter().any(|alias| normalize_name(alias).contains(&query)) {
                results.push(record);
            }
        }
        results
    }

    /// Every canonical name, each followed by its aliases.
    pub fn all_food_names(&self) -> Vec<&str> {
        self.records
            .iter()
            .flat_map(|record| std::iter::once(record.name.as_str()).chain(record.aliases.iter().map(String::as_str)))
            .collect()
    }

    pub fn records(&self) -> &[FoodRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
