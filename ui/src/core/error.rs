//! Error taxonomy for the explorer core.

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("publication date range is inverted: {lower} > {upper}")]
    InvalidDateRange { lower: i32, upper: i32 },

    #[error("{field} filter value `{value}` is not part of the dataset")]
    InvalidFilterValue { field: &'static str, value: String },

    #[error("metric `{0}` is not available for the active source")]
    UnknownMetric(String),

    #[error("unknown data source `{0}`")]
    UnknownSource(String),

    #[error("no datasets have been loaded")]
    EmptyRegistry,

    #[error(
        "ranked country preselection needs at least 11 countries with more than \
         {floor} mentions, found {qualifying}"
    )]
    InsufficientData { qualifying: usize, floor: usize },
}
