//! Coverage summary of a loaded dataset, logged before rendering.

use crate::dataset::{Dataset, MetricColumn};
use log::{info, warn};

/// Present-value coverage of one metric column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnCoverage {
    pub column: MetricColumn,
    pub present: usize,
    /// Smallest and largest `n` with a present value
    pub n_span: Option<(u64, u64)>,
}

/// Summary statistics calculated from a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub n_span: Option<(u64, u64)>,
    pub columns: Vec<ColumnCoverage>,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let n = dataset.n_values();
        let columns = MetricColumn::required()
            .map(|column| {
                let mut present_n = n
                    .iter()
                    .zip(dataset.column(column))
                    .filter(|(_, v)| v.is_some())
                    .map(|(n, _)| *n);
                let first = present_n.next();
                let last = present_n.last().or(first);
                ColumnCoverage {
                    column,
                    present: dataset.present_count(column),
                    n_span: first.zip(last),
                }
            })
            .collect();

        Self {
            rows: dataset.len(),
            n_span: n.first().copied().zip(n.last().copied()),
            columns,
        }
    }

    /// Columns with no measurements at all
    pub fn empty_columns(&self) -> impl Iterator<Item = MetricColumn> + '_ {
        self.columns
            .iter()
            .filter(|c| c.present == 0)
            .map(|c| c.column)
    }

    pub fn log(&self) {
        match self.n_span {
            Some((lo, hi)) => info!("Loaded {} rows, n = {}..={}", self.rows, lo, hi),
            None => warn!("Dataset has no rows; charts will be empty"),
        }

        for c in &self.columns {
            if let Some((lo, hi)) = c.n_span {
                info!("  {:<20} {:>4} points, n = {}..={}", c.column, c.present, lo, hi);
            }
        }
        for column in self.empty_columns() {
            warn!("Column {} has no measurements; its series will be empty", column);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Row;
    use crate::style::Algorithm;

    #[test]
    fn coverage_per_column() {
        let brute = MetricColumn::time(Algorithm::BruteForce);
        let blossom = MetricColumn::time(Algorithm::Blossom);
        let ds = Dataset::from_rows(vec![
            Row::new(4).with(brute, 1.0).with(blossom, 2.0),
            Row::new(16).with(brute, 90.0).with(blossom, 9.0),
            Row::new(200).with(blossom, 400.0),
        ])
        .unwrap();

        let summary = DatasetSummary::from_dataset(&ds);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.n_span, Some((4, 200)));

        let find = |col| summary.columns.iter().find(|c| c.column == col).unwrap();
        assert_eq!(find(brute).n_span, Some((4, 16)));
        assert_eq!(find(blossom).present, 3);
        assert_eq!(find(blossom).n_span, Some((4, 200)));

        // Memory columns were never filled; brute-force memory is not required
        let empty: Vec<_> = summary.empty_columns().collect();
        assert_eq!(empty.len(), 5);
        assert!(empty.iter().all(|c| *c != MetricColumn::memory(Algorithm::BruteForce)));
    }

    #[test]
    fn single_point_span() {
        let column = MetricColumn::memory(Algorithm::IntervalDp);
        let ds = Dataset::from_rows(vec![Row::new(7).with(column, 3.0), Row::new(9)]).unwrap();
        let summary = DatasetSummary::from_dataset(&ds);
        let coverage = summary.columns.iter().find(|c| c.column == column).unwrap();
        assert_eq!(coverage.n_span, Some((7, 7)));
    }

    #[test]
    fn empty_dataset() {
        let summary = DatasetSummary::from_dataset(&Dataset::from_rows(Vec::new()).unwrap());
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.n_span, None);
        assert_eq!(summary.empty_columns().count(), 7);
    }
}
