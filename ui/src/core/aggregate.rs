//! Aggregation engine: filtered records grouped by year (and split value)
//! with one column per catalog metric.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::catalog::{AggOp, Metric, SplitDimension};
use crate::core::error::{CoreError, CoreResult};
use crate::core::filters::FilterState;
use crate::core::record::PubRecord;

/// Secondary group key. Journals split on the scalar label; multi-valued
/// fields group on the whole normalized set, which the chart builder later
/// matches by membership.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SplitValue {
    Label(String),
    Labels(BTreeSet<String>),
}

impl SplitValue {
    pub fn matches(&self, label: &str) -> bool {
        match self {
            Self::Label(value) => value == label,
            Self::Labels(values) => values.contains(label),
        }
    }
}

/// One aggregated group: a year, the optional split value, and the value
/// of every catalog metric over the group's records. Produced fresh on
/// each recomputation, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub year: i32,
    pub split: Option<SplitValue>,
    pub values: BTreeMap<String, Option<f64>>,
}

impl AggregatedRow {
    pub fn value(&self, metric_id: &str) -> Option<f64> {
        self.values.get(metric_id).copied().flatten()
    }
}

/// Pure transform from (records, filters, split, catalog) to aggregated
/// rows. Rows cover exactly the distinct groups present in the filtered
/// data; no zero-filled rows are synthesized for absent combinations.
///
/// Fails fast on an inverted date range or on selections containing
/// values outside the dataset universe; values are never silently
/// corrected. A filter only applies when its selection is a strict subset
/// of the universe.
pub fn aggregate(
    records: &[PubRecord],
    filters: &FilterState,
    split: SplitDimension,
    catalog: &[Metric],
) -> CoreResult<Vec<AggregatedRow>> {
    let (lower, upper) = filters.pubdate;
    if lower > upper {
        return Err(CoreError::InvalidDateRange { lower, upper });
    }

    let journal_universe: BTreeSet<&str> =
        records.iter().map(|record| record.journal.as_str()).collect();
    let country_universe: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.affiliation_country.iter().map(String::as_str))
        .collect();

    for journal in &filters.journals {
        if !journal_universe.contains(journal.as_str()) {
            return Err(CoreError::InvalidFilterValue {
                field: "journal",
                value: journal.clone(),
            });
        }
    }
    for country in &filters.countries {
        if !country_universe.contains(country.as_str()) {
            return Err(CoreError::InvalidFilterValue {
                field: "country",
                value: country.clone(),
            });
        }
    }

    let journal_filter_active = filters.journals.len() < journal_universe.len();
    let country_filter_active = filters.countries.len() < country_universe.len();

    let mut groups: BTreeMap<(i32, Option<SplitValue>), Vec<&PubRecord>> = BTreeMap::new();
    for record in records {
        if record.year < lower || record.year > upper {
            continue;
        }
        if journal_filter_active && !filters.journals.contains(&record.journal) {
            continue;
        }
        if country_filter_active && !filters.countries_match(&record.affiliation_country) {
            continue;
        }

        groups
            .entry((record.year, split_value_of(record, split)))
            .or_default()
            .push(record);
    }

    Ok(groups
        .into_iter()
        .map(|((year, split), members)| AggregatedRow {
            year,
            split,
            values: catalog
                .iter()
                .map(|metric| (metric.id.clone(), apply_op(metric, &members)))
                .collect(),
        })
        .collect())
}

fn split_value_of(record: &PubRecord, split: SplitDimension) -> Option<SplitValue> {
    match split {
        SplitDimension::None => None,
        SplitDimension::Journal => Some(SplitValue::Label(record.journal.clone())),
        SplitDimension::AffiliationCountry => {
            Some(SplitValue::Labels(record.affiliation_country.clone()))
        }
        SplitDimension::FunderInstitute => Some(SplitValue::Labels(record.funder.clone())),
    }
}

fn apply_op(metric: &Metric, members: &[&PubRecord]) -> Option<f64> {
    let trues = members
        .iter()
        .filter(|record| metric.field.value_in(record))
        .count();
    match metric.op {
        AggOp::Percent => percent(trues, members.len()),
        AggOp::CountTrue => Some(trues as f64),
    }
}

/// Share of true values scaled to a percentage. An empty group has no
/// share; it is a missing value, never zero.
pub(crate) fn percent(trues: usize, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(trues as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::catalog::{catalog_for, source_spec};
    use crate::core::record::NONE_LABEL;

    fn sample_records() -> Vec<PubRecord> {
        vec![
            PubRecord::new(2020, "J1", vec!["US".into()], Vec::new(), true, false),
            PubRecord::new(2020, "J1", vec!["US".into()], Vec::new(), false, false),
            PubRecord::new(2021, "J2", vec!["FR".into()], Vec::new(), true, true),
        ]
    }

    fn catalog() -> Vec<Metric> {
        catalog_for(source_spec("RTransparent").expect("configured source"))
    }

    fn full_universe_filters(records: &[PubRecord]) -> FilterState {
        let journals = records.iter().map(|r| r.journal.clone()).collect();
        let countries = records
            .iter()
            .flat_map(|r| r.affiliation_country.iter().cloned())
            .collect();
        FilterState::new((2000, 2024), journals, countries)
    }

    #[test]
    fn percent_per_year_without_split() {
        let records = sample_records();
        let rows = aggregate(
            &records,
            &full_universe_filters(&records),
            SplitDimension::None,
            &catalog(),
        )
        .expect("valid filters");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].year, 2020);
        assert_eq!(rows[0].value("percent_is_data_pred"), Some(50.0));
        assert_eq!(rows[1].year, 2021);
        assert_eq!(rows[1].value("percent_is_data_pred"), Some(100.0));
        assert_eq!(rows[1].value("count_true_is_code_pred"), Some(1.0));
    }

    #[test]
    fn no_rows_for_absent_groups() {
        let records = sample_records();
        let mut filters = full_universe_filters(&records);
        filters.journals = ["J1".to_string()].into_iter().collect();

        let rows = aggregate(&records, &filters, SplitDimension::None, &catalog())
            .expect("valid filters");
        assert!(rows.iter().all(|row| row.year == 2020));
    }

    #[test]
    fn split_groups_on_whole_country_set() {
        let records = vec![
            PubRecord::new(
                2020,
                "J1",
                vec!["US".into(), "FR".into()],
                Vec::new(),
                true,
                false,
            ),
            PubRecord::new(2020, "J1", vec!["US".into()], Vec::new(), false, false),
        ];
        let rows = aggregate(
            &records,
            &full_universe_filters(&records),
            SplitDimension::AffiliationCountry,
            &catalog(),
        )
        .expect("valid filters");

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| {
            row.split
                .as_ref()
                .map(|split| split.matches("US"))
                .unwrap_or(false)
        }));
    }

    #[test]
    fn sentinel_country_matches_when_selected() {
        let records = vec![
            PubRecord::new(2020, "J1", Vec::new(), Vec::new(), true, false),
            PubRecord::new(2020, "J1", vec!["US".into()], Vec::new(), false, false),
        ];
        let mut filters = full_universe_filters(&records);
        filters.countries = [NONE_LABEL.to_string()].into_iter().collect();

        let rows = aggregate(&records, &filters, SplitDimension::None, &catalog())
            .expect("valid filters");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value("percent_is_data_pred"), Some(100.0));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let records = sample_records();
        let mut filters = full_universe_filters(&records);
        filters.pubdate = (2024, 2000);

        let err = aggregate(&records, &filters, SplitDimension::None, &catalog())
            .expect_err("inverted range");
        assert_eq!(
            err,
            CoreError::InvalidDateRange {
                lower: 2024,
                upper: 2000,
            },
        );
    }

    #[test]
    fn out_of_universe_selection_is_rejected() {
        let records = sample_records();
        let mut filters = full_universe_filters(&records);
        filters.countries.insert("Atlantis".to_string());

        let err = aggregate(&records, &filters, SplitDimension::None, &catalog())
            .expect_err("unknown country");
        assert_eq!(
            err,
            CoreError::InvalidFilterValue {
                field: "country",
                value: "Atlantis".to_string(),
            },
        );
    }

    #[test]
    fn empty_dataset_yields_empty_output() {
        let filters = FilterState::new((2000, 2024), BTreeSet::new(), BTreeSet::new());
        let rows = aggregate(&[], &filters, SplitDimension::None, &catalog())
            .expect("empty input is valid");
        assert!(rows.is_empty());
    }

    #[test]
    fn empty_group_percent_is_missing() {
        assert_eq!(percent(0, 0), None);
        assert_eq!(percent(0, 4), Some(0.0));
    }
}
