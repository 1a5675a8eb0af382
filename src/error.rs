//! Error types for dataset loading and style lookup.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a benchmark table into a [`Dataset`](crate::dataset::Dataset).
///
/// Any of these aborts the run before a single chart is drawn.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to open dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("dataset is missing required column `{0}`")]
    MissingColumn(String),

    #[error("line {line}: invalid value {value:?} in column `{column}`: {reason}")]
    InvalidCell {
        line: usize,
        column: String,
        value: String,
        reason: &'static str,
    },

    #[error("n = {0} appears more than once")]
    DuplicateN(u64),
}

/// Style lookup for an identifier outside the fixed algorithm set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown algorithm identifier `{0}`")]
pub struct UnknownAlgorithmError(pub String);
