//! Error types for loading and filtering flight data.

use chrono::NaiveDate;
use thiserror::Error;

/// Fatal errors raised while reading or normalizing the source table.
///
/// Any of these aborts the whole load; callers never see a partial table.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("source has {found} rows, at least {min} are required")]
    TooFewRows { found: usize, min: usize },

    #[error("missing expected column `{0}`")]
    MissingColumn(String),

    #[error("line {line}: cannot read `{column}` from {value:?}")]
    Coercion {
        line: usize,
        column: String,
        value: String,
    },

    #[error("invalid setting {name}: {value:?}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raised when a date range is constructed with its bounds reversed.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("start date {start} is after end date {end}")]
pub struct RangeError {
    pub start: NaiveDate,
    pub end: NaiveDate,
}
