//! Fixed visual encoding for each benchmarked algorithm.
//!
//! Every chart draws an algorithm with the same label, color and marker, so a
//! reader can follow one series across all four figures.

use crate::error::UnknownAlgorithmError;
use plotters::style::RGBColor;
use std::fmt;
use std::str::FromStr;

/// The closed set of algorithms present in the benchmark table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Algorithm {
    BruteForce,
    StateCompressionDp,
    IntervalDp,
    Blossom,
}

/// Marker drawn at every data point of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Square,
    Triangle,
    Diamond,
}

/// Label, color and marker for one algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlgorithmStyle {
    pub label: &'static str,
    pub color: RGBColor,
    pub marker: MarkerShape,
}

// Low-saturation palette that stays readable when printed in grayscale.
const BRUTE_FORCE: AlgorithmStyle = AlgorithmStyle {
    label: "Brute Force",
    color: RGBColor(0x44, 0x44, 0x44),
    marker: MarkerShape::Circle,
};

const STATE_COMPRESSION_DP: AlgorithmStyle = AlgorithmStyle {
    label: "State-Compression DP",
    color: RGBColor(0x1f, 0x77, 0xb4),
    marker: MarkerShape::Square,
};

const INTERVAL_DP: AlgorithmStyle = AlgorithmStyle {
    label: "Interval DP",
    color: RGBColor(0x2c, 0xa0, 0x2c),
    marker: MarkerShape::Triangle,
};

const BLOSSOM: AlgorithmStyle = AlgorithmStyle {
    label: "Blossom",
    color: RGBColor(0x94, 0x67, 0xbd),
    marker: MarkerShape::Diamond,
};

impl Algorithm {
    /// All algorithms in canonical drawing order
    pub const ALL: [Algorithm; 4] = [
        Algorithm::BruteForce,
        Algorithm::StateCompressionDp,
        Algorithm::IntervalDp,
        Algorithm::Blossom,
    ];

    /// Suffix used by this algorithm's metric columns (`time_<key>`, `memory_<key>`)
    pub fn key(self) -> &'static str {
        match self {
            Algorithm::BruteForce => "brute",
            Algorithm::StateCompressionDp => "state_dp",
            Algorithm::IntervalDp => "interval_dp",
            Algorithm::Blossom => "blossom",
        }
    }

    pub fn style(self) -> &'static AlgorithmStyle {
        match self {
            Algorithm::BruteForce => &BRUTE_FORCE,
            Algorithm::StateCompressionDp => &STATE_COMPRESSION_DP,
            Algorithm::IntervalDp => &INTERVAL_DP,
            Algorithm::Blossom => &BLOSSOM,
        }
    }

    /// The harness does not record memory for brute force.
    pub fn tracks_memory(self) -> bool {
        !matches!(self, Algorithm::BruteForce)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.style().label)
    }
}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithmError;

    /// Accepts either the column key or the display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|algo| algo.key() == s || algo.style().label == s)
            .ok_or_else(|| UnknownAlgorithmError(s.to_string()))
    }
}

/// Resolve the style for a textual algorithm identifier
pub fn style_of(id: &str) -> Result<&'static AlgorithmStyle, UnknownAlgorithmError> {
    id.parse::<Algorithm>().map(Algorithm::style)
}
