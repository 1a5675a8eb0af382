//! Benchmark table loading.
//!
//! The harness writes one row per measured input size `n` with a runtime column
//! per algorithm and a memory column per memory-tracked algorithm. Cells it
//! did not measure hold the sentinel `-1`; those become `None` here and stay
//! `None` for the rest of the pipeline.

use crate::error::{DataLoadError, UnknownAlgorithmError};
use crate::style::{style_of, Algorithm};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::Path;

/// Cell value the harness writes for "not measured"
pub const MISSING_SENTINEL: f64 = -1.0;

/// Default input file name
pub const DEFAULT_DATASET: &str = "algorithm_comparison.csv";

/// Measured quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    /// Elapsed time in microseconds
    Time,
    /// Peak memory in kilobytes
    Memory,
}

impl Metric {
    fn prefix(self) -> &'static str {
        match self {
            Metric::Time => "time",
            Metric::Memory => "memory",
        }
    }
}

/// One metric column of the table, e.g. `time_blossom`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricColumn {
    pub metric: Metric,
    pub algorithm: Algorithm,
}

impl MetricColumn {
    pub const fn time(algorithm: Algorithm) -> Self {
        Self { metric: Metric::Time, algorithm }
    }

    pub const fn memory(algorithm: Algorithm) -> Self {
        Self { metric: Metric::Memory, algorithm }
    }

    /// Every metric/algorithm combination, recorded or not
    pub fn all() -> impl Iterator<Item = MetricColumn> {
        [Metric::Time, Metric::Memory].into_iter().flat_map(|metric| {
            Algorithm::ALL
                .into_iter()
                .map(move |algorithm| MetricColumn { metric, algorithm })
        })
    }

    /// Columns the input file must provide
    pub fn required() -> impl Iterator<Item = MetricColumn> {
        Self::all().filter(|c| c.is_recorded())
    }

    /// Whether the harness writes this column at all
    pub fn is_recorded(&self) -> bool {
        match self.metric {
            Metric::Time => true,
            Metric::Memory => self.algorithm.tracks_memory(),
        }
    }

}

impl fmt::Display for MetricColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{}_{}", self.metric.prefix(), self.algorithm.key()))
    }
}

/// A single measured input size with its metric cells.
///
/// Columns missing from `values` are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub n: u64,
    pub values: BTreeMap<MetricColumn, Option<f64>>,
}

impl Row {
    pub fn new(n: u64) -> Self {
        Self {
            n,
            values: BTreeMap::new(),
        }
    }

}

#[cfg(test)]
impl Row {
    /// Builder-style setter for a present value
    pub fn with(mut self, column: MetricColumn, value: f64) -> Self {
        self.values.insert(column, Some(value));
        self
    }
}

/// Read-only benchmark table sorted by ascending `n`
#[derive(Debug, Clone)]
pub struct Dataset {
    n: Vec<u64>,
    columns: BTreeMap<MetricColumn, Vec<Option<f64>>>,
}

/// Raw CSV record, bound to the header by name. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawRecord {
    n: String,
    time_brute: String,
    time_state_dp: String,
    time_interval_dp: String,
    time_blossom: String,
    memory_state_dp: String,
    memory_interval_dp: String,
    memory_blossom: String,
}

impl RawRecord {
    fn cells(&self) -> [(MetricColumn, &str); 7] {
        use Algorithm::*;
        [
            (MetricColumn::time(BruteForce), self.time_brute.as_str()),
            (MetricColumn::time(StateCompressionDp), self.time_state_dp.as_str()),
            (MetricColumn::time(IntervalDp), self.time_interval_dp.as_str()),
            (MetricColumn::time(Blossom), self.time_blossom.as_str()),
            (MetricColumn::memory(StateCompressionDp), self.memory_state_dp.as_str()),
            (MetricColumn::memory(IntervalDp), self.memory_interval_dp.as_str()),
            (MetricColumn::memory(Blossom), self.memory_blossom.as_str()),
        ]
    }

    /// Parse into a [`Row`]; `line` is the 1-based file line for error messages
    fn into_row(self, line: usize) -> Result<Row, DataLoadError> {
        let n = parse_n(&self.n).map_err(|reason| DataLoadError::InvalidCell {
            line,
            column: "n".to_string(),
            value: self.n.clone(),
            reason,
        })?;

        let mut row = Row::new(n);
        for (column, raw) in self.cells() {
            let value = parse_metric(raw).map_err(|reason| DataLoadError::InvalidCell {
                line,
                column: column.to_string(),
                value: raw.to_string(),
                reason,
            })?;
            row.values.insert(column, value);
        }
        Ok(row)
    }
}

/// A header shaped like a metric column whose suffix names no known algorithm
fn unknown_metric_column(header: &str) -> Option<UnknownAlgorithmError> {
    let key = header
        .strip_prefix("time_")
        .or_else(|| header.strip_prefix("memory_"))?;
    style_of(key).err()
}

fn parse_n(raw: &str) -> Result<u64, &'static str> {
    match raw.parse::<u64>() {
        Ok(0) => Err("n must be positive"),
        Ok(n) => Ok(n),
        Err(_) => Err("n must be a positive integer"),
    }
}

/// Empty cells, NaN and the sentinel all mean "not measured".
fn parse_metric(raw: &str) -> Result<Option<f64>, &'static str> {
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw.parse().map_err(|_| "not a number")?;
    if value.is_nan() || value == MISSING_SENTINEL {
        return Ok(None);
    }
    if value.is_infinite() {
        return Err("measurement must be finite");
    }
    if value < 0.0 {
        return Err("measurement must be nonnegative");
    }
    Ok(Some(value))
}

impl Dataset {
    /// Load a benchmark table from a CSV file with a header row
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataLoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let csv_err = |source: csv::Error| DataLoadError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(file);

        // Check the schema up front so a missing column is reported by name
        // rather than as a per-record deserialization failure.
        let headers = reader.headers().map_err(csv_err)?.clone();
        let has = |name: &str| headers.iter().any(|h| h == name);
        if !has("n") {
            return Err(DataLoadError::MissingColumn("n".to_string()));
        }
        if let Some(missing) = MetricColumn::required().find(|c| !has(&c.to_string())) {
            return Err(DataLoadError::MissingColumn(missing.to_string()));
        }
        for header in headers.iter() {
            if let Some(err) = unknown_metric_column(header) {
                warn!("Ignoring column `{}`: {}", header, err);
            }
        }

        let mut rows = Vec::new();
        for (i, record) in reader.deserialize::<RawRecord>().enumerate() {
            let record = record.map_err(csv_err)?;
            // Line 1 is the header
            rows.push(record.into_row(i + 2)?);
        }

        let dataset = Self::from_rows(rows)?;
        debug!("Loaded {} rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Build a dataset from parsed rows, sorting by `n`.
    ///
    /// Sentinel values that slipped through are normalized to `None` here too.
    pub fn from_rows(mut rows: Vec<Row>) -> Result<Self, DataLoadError> {
        rows.sort_by_key(|r| r.n);
        if let Some(pair) = rows.windows(2).find(|w| w[0].n == w[1].n) {
            return Err(DataLoadError::DuplicateN(pair[0].n));
        }

        let n: Vec<u64> = rows.iter().map(|r| r.n).collect();
        let columns = MetricColumn::all()
            .map(|column| {
                let cells = rows
                    .iter()
                    .map(|r| {
                        r.values
                            .get(&column)
                            .copied()
                            .flatten()
                            .filter(|v| *v != MISSING_SENTINEL && !v.is_nan())
                    })
                    .collect();
                (column, cells)
            })
            .collect();

        Ok(Self { n, columns })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.n.len()
    }

    /// Input sizes in ascending order
    pub fn n_values(&self) -> &[u64] {
        &self.n
    }

    /// Cells of one metric column, aligned with [`n_values`](Self::n_values)
    pub fn column(&self, column: MetricColumn) -> &[Option<f64>] {
        self.columns
            .get(&column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of present cells in a column
    pub fn present_count(&self, column: MetricColumn) -> usize {
        self.column(column).iter().filter(|v| v.is_some()).count()
    }
}

#[cfg(test)]
impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.n.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "n,time_brute,time_state_dp,time_interval_dp,time_blossom,\
                          memory_state_dp,memory_interval_dp,memory_blossom";

    fn write_csv(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("bench.csv");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn sentinel_becomes_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            &format!("{HEADER}\n12,1500,30,10,50,-1,-1,-1\n26,-1,-1.0,80.5,60,,NaN,12\n"),
        );
        let ds = Dataset::load(&path).unwrap();

        assert_eq!(ds.n_values(), &[12, 26]);
        assert_eq!(
            ds.column(MetricColumn::time(Algorithm::BruteForce)),
            &[Some(1500.0), None]
        );
        assert_eq!(
            ds.column(MetricColumn::time(Algorithm::StateCompressionDp)),
            &[Some(30.0), None]
        );
        assert_eq!(
            ds.column(MetricColumn::memory(Algorithm::IntervalDp)),
            &[None, None]
        );
        assert_eq!(
            ds.column(MetricColumn::memory(Algorithm::Blossom)),
            &[None, Some(12.0)]
        );
        // Never observed as a numeric -1 anywhere
        for column in MetricColumn::all() {
            assert!(ds.column(column).iter().flatten().all(|v| *v >= 0.0));
        }
    }

    #[test]
    fn rows_are_sorted_and_extra_columns_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            &format!(
                "{HEADER},memory_brute,notes\n\
                 40,-1,-1,900,300,-1,64,48,-1,late\n\
                 4, 12, 3, 2, 40, 1, 1, 8,-1,early\n"
            ),
        );
        let ds = Dataset::load(&path).unwrap();
        assert_eq!(ds.n_values(), &[4, 40]);
        assert_eq!(ds.present_count(MetricColumn::time(Algorithm::Blossom)), 2);
        // memory_brute is never read even when the file carries it
        assert_eq!(ds.present_count(MetricColumn::memory(Algorithm::BruteForce)), 0);
    }

    #[test]
    fn header_only_file_is_an_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, &format!("{HEADER}\n"));
        let ds = Dataset::load(&path).unwrap();
        assert!(ds.is_empty());
        assert!(ds.column(MetricColumn::time(Algorithm::IntervalDp)).is_empty());
    }

    #[test]
    fn missing_n_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let header = HEADER.trim_start_matches("n,");
        let path = write_csv(&dir, &format!("{header}\n1,2,3,4,5,6,7\n"));
        match Dataset::load(&path) {
            Err(DataLoadError::MissingColumn(col)) => assert_eq!(col, "n"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn missing_metric_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "n,time_brute,time_state_dp,time_interval_dp,time_blossom,memory_state_dp,memory_blossom\n\
             4,1,1,1,1,1,1\n",
        );
        match Dataset::load(&path) {
            Err(DataLoadError::MissingColumn(col)) => assert_eq!(col, "memory_interval_dp"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_n_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, &format!("{HEADER}\nten,1,1,1,1,1,1,1\n"));
        match Dataset::load(&path) {
            Err(DataLoadError::InvalidCell { line, column, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(column, "n");
            }
            other => panic!("expected InvalidCell, got {other:?}"),
        }

        let path = write_csv(&dir, &format!("{HEADER}\n0,1,1,1,1,1,1,1\n"));
        assert!(matches!(
            Dataset::load(&path),
            Err(DataLoadError::InvalidCell { .. })
        ));
    }

    #[test]
    fn bad_metric_cells_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, &format!("{HEADER}\n4,1,fast,1,1,1,1,1\n"));
        match Dataset::load(&path) {
            Err(DataLoadError::InvalidCell { column, value, .. }) => {
                assert_eq!(column, "time_state_dp");
                assert_eq!(value, "fast");
            }
            other => panic!("expected InvalidCell, got {other:?}"),
        }

        // Only -1 is the sentinel; other negatives are not measurements
        let path = write_csv(&dir, &format!("{HEADER}\n4,1,1,-2,1,1,1,1\n"));
        assert!(matches!(
            Dataset::load(&path),
            Err(DataLoadError::InvalidCell { .. })
        ));
    }

    #[test]
    fn duplicate_n_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            &format!("{HEADER}\n8,1,1,1,1,1,1,1\n8,2,2,2,2,2,2,2\n"),
        );
        assert!(matches!(
            Dataset::load(&path),
            Err(DataLoadError::DuplicateN(8))
        ));
    }

    #[test]
    fn ragged_row_is_a_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, &format!("{HEADER}\n8,1,1,1\n"));
        assert!(matches!(
            Dataset::load(&path),
            Err(DataLoadError::Csv { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::load(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io { .. }), "{err}");
    }

    #[test]
    fn from_rows_normalizes_sentinel() {
        let column = MetricColumn::time(Algorithm::Blossom);
        let ds = Dataset::from_rows(vec![
            Row::new(30).with(column, 5.0),
            Row::new(20).with(column, MISSING_SENTINEL),
        ])
        .unwrap();
        assert_eq!(ds.n_values(), &[20, 30]);
        assert_eq!(ds.column(column), &[None, Some(5.0)]);
    }

    #[test]
    fn column_names_match_header() {
        let names: Vec<String> = MetricColumn::required().map(|c| c.to_string()).collect();
        let header: Vec<&str> = HEADER.split(',').skip(1).collect();
        assert_eq!(names, header);
        assert_eq!(
            MetricColumn::memory(Algorithm::IntervalDp).to_string(),
            "memory_interval_dp"
        );
    }

    #[test]
    fn column_display_honors_width() {
        let column = MetricColumn::time(Algorithm::Blossom);
        assert_eq!(format!("{column:<16}|"), "time_blossom    |");
        assert_eq!(format!("{column:>14}"), "  time_blossom");
    }

    #[test]
    fn metric_like_headers_with_unknown_algorithms_are_flagged() {
        assert_eq!(
            unknown_metric_column("time_greedy"),
            Some(UnknownAlgorithmError("greedy".to_string()))
        );
        assert!(unknown_metric_column("memory_annealing").is_some());
        // Known algorithms, including the unrecorded brute-force memory column
        assert_eq!(unknown_metric_column("time_blossom"), None);
        assert_eq!(unknown_metric_column("memory_brute"), None);
        // Not metric columns at all
        assert_eq!(unknown_metric_column("n"), None);
        assert_eq!(unknown_metric_column("notes"), None);
    }

    #[test]
    fn unknown_metric_columns_do_not_block_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, &format!("{HEADER},time_greedy\n8,1,1,1,1,1,1,1,5\n"));
        let ds = Dataset::load(&path).unwrap();
        assert_eq!(ds.n_values(), &[8]);
    }
}
