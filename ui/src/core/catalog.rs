//! Metric catalog and per-source configuration.
//!
//! Each extraction tool publishes a fixed set of boolean prediction fields;
//! crossing them with the aggregation operators yields the ordered catalog
//! of metric choices shown in the top bar.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::record::PubRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricField {
    IsDataPred,
    IsCodePred,
}

impl MetricField {
    pub fn key(self) -> &'static str {
        match self {
            Self::IsDataPred => "is_data_pred",
            Self::IsCodePred => "is_code_pred",
        }
    }

    pub fn value_in(self, record: &PubRecord) -> bool {
        match self {
            Self::IsDataPred => record.is_data_pred,
            Self::IsCodePred => record.is_code_pred,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggOp {
    Percent,
    CountTrue,
}

impl AggOp {
    pub fn key(self) -> &'static str {
        match self {
            Self::Percent => "percent",
            Self::CountTrue => "count_true",
        }
    }
}

/// One selectable metric: an aggregation operator applied to a field,
/// rendered under a human-readable title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub id: String,
    pub title: String,
    pub op: AggOp,
    pub field: MetricField,
}

impl Metric {
    fn new(op: AggOp, field: MetricField) -> Self {
        Self {
            id: format!("{}_{}", op.key(), field.key()),
            title: metric_title(op, field).to_string(),
            op,
            field,
        }
    }
}

fn metric_title(op: AggOp, field: MetricField) -> &'static str {
    match (op, field) {
        (AggOp::Percent, MetricField::IsDataPred) => "Data Sharing (%)",
        (AggOp::Percent, MetricField::IsCodePred) => "Code Sharing (%)",
        (AggOp::CountTrue, MetricField::IsDataPred) => "Data Sharing",
        (AggOp::CountTrue, MetricField::IsCodePred) => "Code Sharing",
    }
}

/// Secondary group-by key used to break a metric trend into comparable
/// series. `None` keeps a single aggregate series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitDimension {
    None,
    Journal,
    AffiliationCountry,
    FunderInstitute,
}

impl SplitDimension {
    pub fn key(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Journal => "journal",
            Self::AffiliationCountry => "affiliation_country",
            Self::FunderInstitute => "funder_institute",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "None" => Some(Self::None),
            "journal" => Some(Self::Journal),
            "affiliation_country" => Some(Self::AffiliationCountry),
            "funder_institute" => Some(Self::FunderInstitute),
            _ => None,
        }
    }
}

impl std::fmt::Display for SplitDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Static configuration for one extraction-tool source.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub name: &'static str,
    pub metric_fields: &'static [MetricField],
    pub splitting_vars: &'static [SplitDimension],
}

static SOURCES: Lazy<Vec<SourceSpec>> = Lazy::new(|| {
    vec![SourceSpec {
        name: "RTransparent",
        metric_fields: &[MetricField::IsDataPred, MetricField::IsCodePred],
        splitting_vars: &[
            SplitDimension::None,
            SplitDimension::Journal,
            SplitDimension::AffiliationCountry,
            SplitDimension::FunderInstitute,
        ],
    }]
});

pub fn source_spec(name: &str) -> Option<&'static SourceSpec> {
    SOURCES.iter().find(|spec| spec.name == name)
}

fn ops_for(_field: MetricField) -> &'static [AggOp] {
    &[AggOp::Percent, AggOp::CountTrue]
}

/// Builds the ordered metric catalog for a source: fields in configured
/// order, each crossed with its operators. The first entry doubles as the
/// default selection.
pub fn catalog_for(spec: &SourceSpec) -> Vec<Metric> {
    spec.metric_fields
        .iter()
        .flat_map(|&field| ops_for(field).iter().map(move |&op| Metric::new(op, field)))
        .collect()
}
