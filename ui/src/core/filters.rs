//! Filter state applied to a dataset snapshot before aggregation.

use std::collections::BTreeSet;

use serde::Serialize;

/// Current filter values: inclusive publication-year bounds plus the
/// selected journal and country sets. The candidate universes live on the
/// engine; selections here are always subsets of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub pubdate: (i32, i32),
    pub journals: BTreeSet<String>,
    pub countries: BTreeSet<String>,
}

impl FilterState {
    pub fn new(
        pubdate: (i32, i32),
        journals: BTreeSet<String>,
        countries: BTreeSet<String>,
    ) -> Self {
        Self {
            pubdate,
            journals,
            countries,
        }
    }

    /// Set-intersection match for multi-valued fields. The sentinel label
    /// participates like any other value, so records without countries
    /// match exactly when `"None"` is selected.
    pub fn countries_match(&self, countries: &BTreeSet<String>) -> bool {
        countries.iter().any(|label| self.countries.contains(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::record::normalize_labels;

    fn selection(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn sentinel_matches_only_when_selected() {
        let no_countries = normalize_labels(Vec::new());

        let with_sentinel = FilterState::new((2000, 2024), selection(&[]), selection(&["None"]));
        assert!(with_sentinel.countries_match(&no_countries));

        let without_sentinel = FilterState::new((2000, 2024), selection(&[]), selection(&["US"]));
        assert!(!without_sentinel.countries_match(&no_countries));
    }

    #[test]
    fn any_overlap_matches() {
        let filters = FilterState::new((2000, 2024), selection(&[]), selection(&["FR", "DE"]));
        let record_countries = normalize_labels(vec!["US".into(), "DE".into()]);
        assert!(filters.countries_match(&record_countries));
    }
}
