use thiserror::Error;

/// Failure to build the `Timestamp` column from the date and time fields.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimestampError {
    #[error("cannot build timestamp: column '{0}' is missing")]
    MissingColumn(String),

    #[error("cannot build timestamp: row {row} has unparseable value '{value}'")]
    Unparseable { row: usize, value: String },
}

/// Why a single KPI or aggregate could not be produced.
///
/// These never abort a run; the report prints them as warnings next to the
/// metrics that did compute.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("no data")]
    NoData,

    #[error("missing column '{column}' (available columns: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("column '{0}' has no numeric values")]
    NoValues(String),

    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown mesh type '{0}' (expected one of: API 100, API 140, API 170, API 200)")]
    UnknownMesh(String),

    #[error("utilization threshold {0}% is outside 50..=100")]
    ThresholdOutOfRange(u32),

    #[error("invalid heuristic '{name}': {reason}")]
    InvalidHeuristic { name: &'static str, reason: String },

    #[error("failed to load configuration file: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open input: {0}")]
    Io(#[from] std::io::Error),
}
