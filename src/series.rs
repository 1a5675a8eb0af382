//! Per-chart data selection.

use crate::dataset::{Dataset, MetricColumn};

/// Inclusive bound on `n`; either end may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NRange {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl NRange {
    pub const ALL: NRange = NRange { min: None, max: None };

    pub const fn at_most(max: u64) -> Self {
        Self { min: None, max: Some(max) }
    }

    pub const fn at_least(min: u64) -> Self {
        Self { min: Some(min), max: None }
    }

    pub fn contains(&self, n: u64) -> bool {
        self.min.map_or(true, |min| n >= min) && self.max.map_or(true, |max| n <= max)
    }
}

/// Present `(n, value)` points of one column, ascending in `n`
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub column: MetricColumn,
    pub points: Vec<(u64, f64)>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Points as plot coordinates
    pub fn coords(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().map(|&(n, v)| (n as f64, v))
    }
}

/// Select the present values of `column` whose `n` lies in `range`.
///
/// An all-absent column or an empty range yields an empty series.
pub fn select(dataset: &Dataset, column: MetricColumn, range: NRange) -> Series {
    let points = dataset
        .n_values()
        .iter()
        .zip(dataset.column(column))
        .filter(|(n, _)| range.contains(**n))
        .filter_map(|(&n, value)| value.map(|v| (n, v)))
        .collect();

    Series { column, points }
}
