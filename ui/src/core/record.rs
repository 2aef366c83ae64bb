//! Publication records, dataset snapshots, and the registry of loaded sources.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label standing in for a record with no values in a multi-valued field.
pub const NONE_LABEL: &str = "None";

/// One publication observation. Immutable once built; multi-valued fields
/// are normalized at construction so every consumer sees identical sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PubRecord {
    pub year: i32,
    pub journal: String,
    pub affiliation_country: BTreeSet<String>,
    pub funder: BTreeSet<String>,
    pub is_data_pred: bool,
    pub is_code_pred: bool,
}

impl PubRecord {
    pub fn new(
        year: i32,
        journal: impl Into<String>,
        affiliation_country: Vec<String>,
        funder: Vec<String>,
        is_data_pred: bool,
        is_code_pred: bool,
    ) -> Self {
        Self {
            year,
            journal: journal.into(),
            affiliation_country: normalize_labels(affiliation_country),
            funder: normalize_labels(funder),
            is_data_pred,
            is_code_pred,
        }
    }
}

/// Loader-facing row as it arrives from the upstream store. List columns
/// may be null; conversion into [PubRecord] applies the normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub year: i32,
    pub journal: String,
    #[serde(default)]
    pub affiliation_country: Option<Vec<String>>,
    #[serde(default)]
    pub funder: Option<Vec<String>>,
    pub is_data_pred: bool,
    pub is_code_pred: bool,
}

impl From<RawRecord> for PubRecord {
    fn from(raw: RawRecord) -> Self {
        Self::new(
            raw.year,
            raw.journal,
            raw.affiliation_country.unwrap_or_default(),
            raw.funder.unwrap_or_default(),
            raw.is_data_pred,
            raw.is_code_pred,
        )
    }
}

/// Trims, deduplicates, and drops empty values; an empty result collapses
/// to the sentinel set `{"None"}` so filtering and grouping stay total.
pub fn normalize_labels(values: Vec<String>) -> BTreeSet<String> {
    let mut labels: BTreeSet<String> = values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();

    if labels.is_empty() {
        labels.insert(NONE_LABEL.to_string());
    }

    labels
}

/// Read-only collection of records for one extraction-tool source.
/// Replaced wholesale on reload; the id ties derived caches to one
/// generation of the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    id: Uuid,
    records: Vec<PubRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<PubRecord>) -> Self {
        Self {
            id: Uuid::new_v4(),
            records,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn records(&self) -> &[PubRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn year_min(&self) -> Option<i32> {
        self.records.iter().map(|record| record.year).min()
    }

    pub fn year_max(&self) -> Option<i32> {
        self.records.iter().map(|record| record.year).max()
    }

    /// Distinct journals in first-appearance order.
    pub fn journal_universe(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut journals = Vec::new();
        for record in &self.records {
            if seen.insert(record.journal.as_str()) {
                journals.push(record.journal.clone());
            }
        }
        journals
    }

    /// Occurrences per country label across exploded per-record sets.
    /// A record without countries contributes one sentinel occurrence.
    pub fn country_counts(&self) -> BTreeMap<String, usize> {
        exploded_counts(self.records.iter().map(|record| &record.affiliation_country))
    }

    /// Occurrences per funder label, with the same sentinel handling.
    pub fn funder_counts(&self) -> BTreeMap<String, usize> {
        exploded_counts(self.records.iter().map(|record| &record.funder))
    }
}

fn exploded_counts<'a>(
    sets: impl Iterator<Item = &'a BTreeSet<String>>,
) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for set in sets {
        for label in set {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Memo of one snapshot's country counts, keyed by snapshot identity.
/// Looking up against a different snapshot recomputes and replaces the
/// entry; stale generations are never served.
#[derive(Debug, Clone, Default)]
pub struct CountCache {
    entry: Option<(Uuid, Arc<BTreeMap<String, usize>>)>,
}

impl CountCache {
    pub fn counts(&mut self, snapshot: &Snapshot) -> Arc<BTreeMap<String, usize>> {
        if let Some((id, counts)) = &self.entry {
            if *id == snapshot.id() {
                return counts.clone();
            }
        }

        let counts = Arc::new(snapshot.country_counts());
        self.entry = Some((snapshot.id(), counts.clone()));
        counts
    }
}

/// Ordered mapping from source name to its published snapshot. The first
/// entry is the default source shown at boot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetRegistry {
    entries: Vec<(String, Arc<Snapshot>)>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a snapshot under `name`, replacing any previous
    /// generation in place.
    pub fn insert(&mut self, name: impl Into<String>, snapshot: Snapshot) {
        let name = name.into();
        let snapshot = Arc::new(snapshot);
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = snapshot,
            None => self.entries.push((name, snapshot)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Snapshot>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, snapshot)| snapshot)
    }

    pub fn first_source(&self) -> Option<&str> {
        self.entries.first().map(|(name, _)| name.as_str())
    }

    pub fn source_names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
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

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn normalization_trims_dedupes_and_drops_empties() {
        let set = normalize_labels(labels(&[" United States", "France ", "United States", ""]));
        let expected: BTreeSet<String> =
            labels(&["France", "United States"]).into_iter().collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn empty_and_blank_lists_collapse_to_sentinel() {
        let expected: BTreeSet<String> = labels(&[NONE_LABEL]).into_iter().collect();
        assert_eq!(normalize_labels(Vec::new()), expected);
        assert_eq!(normalize_labels(labels(&[""])), expected);
        assert_eq!(normalize_labels(labels(&["  "])), expected);
    }

    #[test]
    fn country_counts_count_sentinel_once_per_record() {
        let snapshot = Snapshot::new(vec![
            PubRecord::new(2020, "J1", labels(&["US", "FR"]), Vec::new(), true, false),
            PubRecord::new(2020, "J1", Vec::new(), Vec::new(), false, false),
            PubRecord::new(2021, "J2", Vec::new(), Vec::new(), true, true),
        ]);

        let counts = snapshot.country_counts();
        assert_eq!(counts.get("US"), Some(&1));
        assert_eq!(counts.get("FR"), Some(&1));
        assert_eq!(counts.get(NONE_LABEL), Some(&2));
    }

    #[test]
    fn journal_universe_keeps_first_appearance_order() {
        let snapshot = Snapshot::new(vec![
            PubRecord::new(2020, "B", Vec::new(), Vec::new(), false, false),
            PubRecord::new(2020, "A", Vec::new(), Vec::new(), false, false),
            PubRecord::new(2021, "B", Vec::new(), Vec::new(), false, false),
        ]);
        assert_eq!(snapshot.journal_universe(), vec!["B", "A"]);
    }

    #[test]
    fn count_cache_invalidates_on_snapshot_change() {
        let first = Snapshot::new(vec![PubRecord::new(
            2020,
            "J1",
            labels(&["US"]),
            Vec::new(),
            true,
            false,
        )]);
        let second = Snapshot::new(vec![PubRecord::new(
            2020,
            "J1",
            labels(&["FR"]),
            Vec::new(),
            true,
            false,
        )]);

        let mut cache = CountCache::default();
        assert!(cache.counts(&first).contains_key("US"));

        let counts = cache.counts(&second);
        assert!(counts.contains_key("FR"));
        assert!(!counts.contains_key("US"));
    }

    #[test]
    fn registry_replaces_snapshots_in_place() {
        let mut registry = DatasetRegistry::new();
        registry.insert("RTransparent", Snapshot::new(Vec::new()));
        registry.insert("Other", Snapshot::new(Vec::new()));

        let replacement = Snapshot::new(vec![PubRecord::new(
            2020,
            "J1",
            Vec::new(),
            Vec::new(),
            false,
            false,
        )]);
        let replacement_id = replacement.id();
        registry.insert("RTransparent", replacement);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.first_source(), Some("RTransparent"));
        assert_eq!(registry.get("RTransparent").map(|s| s.id()), Some(replacement_id));
    }
}
