//! Chart series builder: aggregated rows plus current selections become a
//! renderer-agnostic chart specification.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::aggregate::AggregatedRow;
use crate::core::catalog::{Metric, SplitDimension};
use crate::core::error::{CoreError, CoreResult};

/// Output boundary of the dashboard core: axis domain, named series with
/// axis-aligned data vectors, legend entries, and a title. Consumed by a
/// rendering layer; visual encoding is its concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_axis: Vec<i32>,
    pub series: Vec<Series>,
    pub legend: Vec<LegendEntry>,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub id: String,
    pub name: String,
    /// One slot per axis year, in axis order. A year the series has no
    /// group for stays a gap rather than shifting later points.
    pub points: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub name: String,
}

/// Builds the chart for the selected metric. Splitting produces one
/// series per selected split label (sorted ascending); duplicate
/// (label, year) groups re-aggregate by mean. An uninitialized date range
/// yields the explicit empty chart, never an error.
pub fn build_series(
    rows: &[AggregatedRow],
    split: SplitDimension,
    selected: &BTreeSet<String>,
    metric_title: &str,
    catalog: &[Metric],
    pubdate: Option<(i32, i32)>,
) -> CoreResult<ChartSpec> {
    let metric = catalog
        .iter()
        .find(|metric| metric.title == metric_title)
        .ok_or_else(|| CoreError::UnknownMetric(metric_title.to_string()))?;

    let Some((lower, upper)) = pubdate else {
        return Ok(ChartSpec::default());
    };

    let mut x_axis: Vec<i32> = rows.iter().map(|row| row.year).collect();
    x_axis.sort_unstable();
    x_axis.dedup();

    let series = match split {
        SplitDimension::None => {
            let points = x_axis
                .iter()
                .map(|&year| {
                    rows.iter()
                        .find(|row| row.year == year && row.split.is_none())
                        .and_then(|row| row.value(&metric.id))
                })
                .collect();
            vec![Series {
                id: metric.title.clone(),
                name: metric.title.clone(),
                points,
            }]
        }
        _ => selected
            .iter()
            .map(|label| Series {
                id: label.clone(),
                name: label.clone(),
                points: x_axis
                    .iter()
                    .map(|&year| mean_for_label(rows, year, label, &metric.id))
                    .collect(),
            })
            .collect(),
    };

    let legend = series
        .iter()
        .map(|series| LegendEntry {
            name: series.name.clone(),
        })
        .collect();

    Ok(ChartSpec {
        title: format!("{} by {} ({lower}-{upper})", metric.title, split),
        x_axis,
        series,
        legend,
    })
}

/// Mean of the metric over every row of one year matching the label.
/// Missing values are skipped; a year with no present value stays a gap.
fn mean_for_label(rows: &[AggregatedRow], year: i32, label: &str, metric_id: &str) -> Option<f64> {
    let values: Vec<f64> = rows
        .iter()
        .filter(|row| {
            row.year == year
                && row
                    .split
                    .as_ref()
                    .map(|split| split.matches(label))
                    .unwrap_or(false)
        })
        .filter_map(|row| row.value(metric_id))
        .collect();

    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use crate::core::aggregate::SplitValue;
    use crate::core::catalog::{catalog_for, source_spec};

    const METRIC: &str = "Data Sharing (%)";
    const METRIC_ID: &str = "percent_is_data_pred";

    fn catalog() -> Vec<Metric> {
        catalog_for(source_spec("RTransparent").expect("configured source"))
    }

    fn row(year: i32, split: Option<SplitValue>, value: f64) -> AggregatedRow {
        let mut values = BTreeMap::new();
        values.insert(METRIC_ID.to_string(), Some(value));
        AggregatedRow { year, split, values }
    }

    fn label(value: &str) -> Option<SplitValue> {
        Some(SplitValue::Label(value.to_string()))
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let err = build_series(
            &[],
            SplitDimension::None,
            &BTreeSet::new(),
            "Mean Score",
            &catalog(),
            Some((2000, 2024)),
        )
        .expect_err("stale selection");
        assert_eq!(err, CoreError::UnknownMetric("Mean Score".to_string()));
    }

    #[test]
    fn uninitialized_filters_build_an_empty_chart() {
        let spec = build_series(
            &[],
            SplitDimension::None,
            &BTreeSet::new(),
            METRIC,
            &catalog(),
            None,
        )
        .expect("empty chart");
        assert!(spec.is_empty());
        assert!(spec.x_axis.is_empty());
    }

    #[test]
    fn single_series_aligns_gaps_to_the_axis() {
        let rows = vec![
            row(2020, None, 50.0),
            row(2022, None, 75.0),
            row(2021, label("J1"), 10.0),
        ];
        let spec = build_series(
            &rows,
            SplitDimension::None,
            &BTreeSet::new(),
            METRIC,
            &catalog(),
            Some((2020, 2022)),
        )
        .expect("valid chart");

        assert_eq!(spec.x_axis, vec![2020, 2021, 2022]);
        assert_eq!(spec.series.len(), 1);
        assert_eq!(spec.series[0].points, vec![Some(50.0), None, Some(75.0)]);
        assert_eq!(spec.title, "Data Sharing (%) by None (2020-2022)");
    }

    #[test]
    fn split_series_follow_selection_order_and_average_duplicates() {
        let rows = vec![
            row(2020, label("J2"), 40.0),
            row(2020, label("J1"), 10.0),
            row(2020, label("J1"), 30.0),
            row(2021, label("J1"), 80.0),
        ];
        let selected: BTreeSet<String> =
            ["J2".to_string(), "J1".to_string()].into_iter().collect();

        let spec = build_series(
            &rows,
            SplitDimension::Journal,
            &selected,
            METRIC,
            &catalog(),
            Some((2020, 2021)),
        )
        .expect("valid chart");

        let names: Vec<&str> = spec.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["J1", "J2"]);
        assert_eq!(spec.series[0].points, vec![Some(20.0), Some(80.0)]);
        assert_eq!(spec.series[1].points, vec![Some(40.0), None]);
        assert_eq!(spec.legend.len(), 2);
        assert_eq!(spec.legend[0].name, "J1");
    }

    #[test]
    fn chart_spec_serializes_for_the_render_boundary() {
        let rows = vec![row(2020, None, 50.0)];
        let spec = build_series(
            &rows,
            SplitDimension::None,
            &BTreeSet::new(),
            METRIC,
            &catalog(),
            Some((2020, 2020)),
        )
        .expect("valid chart");

        let value = serde_json::to_value(&spec).expect("serializable");
        assert_eq!(value["x_axis"], serde_json::json!([2020]));
        assert_eq!(value["series"][0]["points"], serde_json::json!([50.0]));
        assert_eq!(value["legend"][0]["name"], serde_json::json!("Data Sharing (%)"));
    }

    #[test]
    fn membership_split_values_feed_every_matching_series() {
        let countries: BTreeSet<String> =
            ["FR".to_string(), "US".to_string()].into_iter().collect();
        let rows = vec![row(2020, Some(SplitValue::Labels(countries.clone())), 60.0)];

        let spec = build_series(
            &rows,
            SplitDimension::AffiliationCountry,
            &countries,
            METRIC,
            &catalog(),
            Some((2020, 2020)),
        )
        .expect("valid chart");

        assert_eq!(spec.series.len(), 2);
        assert!(spec
            .series
            .iter()
            .all(|series| series.points == vec![Some(60.0)]));
    }
}
