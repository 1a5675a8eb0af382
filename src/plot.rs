//! Chart generation from a loaded benchmark dataset.

use crate::dataset::{Dataset, Metric, MetricColumn};
use crate::series::{select, NRange, Series};
use crate::style::{Algorithm, AlgorithmStyle, MarkerShape};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use num_format::{Locale, ToFormattedString};
use plotters::chart::SeriesAnno;
use plotters::coord::ranged1d::{AsRangedCoord, Ranged, ValueFormatter};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::{Path, PathBuf};

/// Canvas size: a 7.5 x 5.2 inch figure at 200 px per inch
pub const FIGURE_SIZE: (u32, u32) = (1500, 1040);

const TITLE_FONT_SIZE: u32 = 40;
const AXIS_DESC_FONT_SIZE: u32 = 30;
const TICK_FONT_SIZE: u32 = 26;
const LEGEND_FONT_SIZE: u32 = 26;

const LINE_WIDTH: u32 = 2;
/// Marker half-extent in pixels
const MARKER_SIZE: i32 = 7;
const GRID_ALPHA: f64 = 0.25;
const REFERENCE_LINE_COLOR: RGBColor = RGBColor(0x80, 0x80, 0x80);

const X_DESC: &str = "Odd-degree vertex count n";

/// Axis mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisScale {
    Linear,
    Log,
}

/// Axis limits, either pinned or derived from the drawn points
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisRange {
    Fixed(f64, f64),
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisConfig {
    pub scale: AxisScale,
    pub range: AxisRange,
    pub desc: &'static str,
}

impl AxisConfig {
    const fn new(scale: AxisScale, range: AxisRange, desc: &'static str) -> Self {
        Self { scale, range, desc }
    }

    /// Whether a coordinate can be placed on this axis at all
    fn placeable(&self, v: f64) -> bool {
        match self.scale {
            AxisScale::Linear => v.is_finite(),
            AxisScale::Log => v.is_finite() && v > 0.0,
        }
    }

    /// Whether a placeable coordinate falls inside the visible window
    fn in_window(&self, v: f64) -> bool {
        match self.range {
            AxisRange::Fixed(lo, hi) => (lo..=hi).contains(&v),
            AxisRange::Auto => true,
        }
    }

    /// Window limits in view space; unbounded for autoscaled axes
    fn view_window(&self) -> (f64, f64) {
        match self.range {
            AxisRange::Fixed(lo, hi) => (self.to_view(lo), self.to_view(hi)),
            AxisRange::Auto => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    /// Map a data coordinate into the space where the axis is linear
    fn to_view(&self, v: f64) -> f64 {
        match self.scale {
            AxisScale::Linear => v,
            AxisScale::Log => v.log10(),
        }
    }

    fn from_view(&self, v: f64) -> f64 {
        match self.scale {
            AxisScale::Linear => v,
            AxisScale::Log => 10f64.powf(v),
        }
    }

    /// Limits for this axis given the coordinates that will be drawn on it
    pub fn bounds(&self, values: impl Iterator<Item = f64>) -> (f64, f64) {
        match self.range {
            AxisRange::Fixed(lo, hi) => (lo, hi),
            AxisRange::Auto => autoscale(self.scale, values),
        }
    }

    fn tick_label(&self, v: &f64) -> String {
        match self.scale {
            AxisScale::Linear => linear_tick(*v),
            AxisScale::Log => log_tick(*v),
        }
    }
}

/// Linear axes get 5% headroom; log axes snap outwards to whole decades.
fn autoscale(scale: AxisScale, values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    match scale {
        AxisScale::Linear => {
            if !min.is_finite() {
                return (0.0, 1.0);
            }
            let mut span = max - min;
            if span == 0.0 {
                span = max.abs().max(1.0);
            }
            let pad = span * 0.05;
            (min - pad, max + pad)
        }
        AxisScale::Log => {
            if !min.is_finite() {
                return (1.0, 10.0);
            }
            let lo = 10f64.powi(min.log10().floor() as i32);
            let mut hi = 10f64.powi(max.log10().ceil() as i32);
            if hi <= lo {
                hi = lo * 10.0;
            }
            (lo, hi)
        }
    }
}

fn linear_tick(v: f64) -> String {
    if v.abs() < 1e-9 {
        return "0".to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return (v as i64).to_formatted_string(&Locale::en);
    }
    let s = format!("{v:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn log_tick(v: f64) -> String {
    if v >= 1e4 {
        format!("{v:.0e}")
    } else {
        linear_tick(v)
    }
}

/// The four fixed charts, in rendering order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    TimeComparison,
    SmallScale,
    Polynomial,
    Memory,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::TimeComparison,
        ChartKind::SmallScale,
        ChartKind::Polynomial,
        ChartKind::Memory,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::TimeComparison => "time_comparison_log.svg",
            ChartKind::SmallScale => "small_scale_comparison.svg",
            ChartKind::Polynomial => "polynomial_comparison.svg",
            ChartKind::Memory => "memory_comparison.svg",
        }
    }

    pub fn config(self) -> ChartConfig {
        use Algorithm::*;
        use AxisRange::*;
        use AxisScale::*;

        match self {
            // Crossover markers at n = 12 and n = 22, where the exponential
            // algorithms stop being practical.
            ChartKind::TimeComparison => ChartConfig {
                kind: self,
                title: "Runtime comparison across algorithms",
                metric: Metric::Time,
                algorithms: &[BruteForce, StateCompressionDp, IntervalDp, Blossom],
                n_range: NRange::ALL,
                x: AxisConfig::new(Linear, Fixed(0.0, 520.0), X_DESC),
                y: AxisConfig::new(Log, Fixed(0.5, 1e8), "Runtime (μs, log scale)"),
                reference_lines: &[12.0, 22.0],
                series_alpha: 0.9,
            },
            ChartKind::SmallScale => ChartConfig {
                kind: self,
                title: "Small-scale comparison (n ≤ 22)",
                metric: Metric::Time,
                algorithms: &[BruteForce, StateCompressionDp, IntervalDp],
                n_range: NRange::at_most(22),
                x: AxisConfig::new(Linear, Auto, X_DESC),
                y: AxisConfig::new(Linear, Auto, "Runtime (μs)"),
                reference_lines: &[],
                series_alpha: 1.0,
            },
            ChartKind::Polynomial => ChartConfig {
                kind: self,
                title: "Polynomial-time algorithm comparison",
                metric: Metric::Time,
                algorithms: &[IntervalDp, Blossom],
                n_range: NRange::at_least(20),
                x: AxisConfig::new(Linear, Auto, X_DESC),
                y: AxisConfig::new(Linear, Auto, "Runtime (μs)"),
                reference_lines: &[],
                series_alpha: 1.0,
            },
            // Brute force has no memory column
            ChartKind::Memory => ChartConfig {
                kind: self,
                title: "Memory usage comparison",
                metric: Metric::Memory,
                algorithms: &[StateCompressionDp, IntervalDp, Blossom],
                n_range: NRange::ALL,
                x: AxisConfig::new(Log, Auto, X_DESC),
                y: AxisConfig::new(Log, Auto, "Memory (KB, log scale)"),
                reference_lines: &[],
                series_alpha: 1.0,
            },
        }
    }

    fn legend_position(self) -> SeriesLabelPosition {
        match self {
            ChartKind::SmallScale => SeriesLabelPosition::UpperLeft,
            ChartKind::Memory => SeriesLabelPosition::LowerRight,
            ChartKind::TimeComparison | ChartKind::Polynomial => SeriesLabelPosition::UpperRight,
        }
    }
}

/// Everything that determines how one chart looks
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub title: &'static str,
    pub metric: Metric,
    pub algorithms: &'static [Algorithm],
    pub n_range: NRange,
    pub x: AxisConfig,
    pub y: AxisConfig,
    /// Vertical dashed lines at these x positions
    pub reference_lines: &'static [f64],
    pub series_alpha: f64,
}

/// A series ready to draw
#[derive(Debug, Clone)]
pub struct PlottedSeries {
    pub algorithm: Algorithm,
    pub style: &'static AlgorithmStyle,
    /// Every point that can be placed on the axis scales
    pub points: Vec<(f64, f64)>,
    /// Line pieces cut at the window edges
    pub paths: Vec<Vec<(f64, f64)>>,
    /// Points inside the window, drawn with the series marker
    pub markers: Vec<(f64, f64)>,
}

impl ChartConfig {
    /// Select this chart's series from the dataset, in legend order
    pub fn select_series(&self, dataset: &Dataset) -> Vec<Series> {
        self.algorithms
            .iter()
            .map(|&algorithm| {
                let column = MetricColumn {
                    metric: self.metric,
                    algorithm,
                };
                select(dataset, column, self.n_range)
            })
            .collect()
    }

    /// Resolve styles, drop points that cannot be placed on the axes and
    /// cut the remaining lines at the window edges
    pub fn plot_series(&self, dataset: &Dataset) -> Vec<PlottedSeries> {
        self.select_series(dataset)
            .into_iter()
            .map(|series| {
                let algorithm = series.column.algorithm;
                if series.is_empty() {
                    debug!("{}: {} has no data", self.kind.file_name(), series.column);
                }

                let points: Vec<(f64, f64)> = series
                    .coords()
                    .filter(|&(x, y)| self.x.placeable(x) && self.y.placeable(y))
                    .collect();
                let skipped = series.len() - points.len();
                if skipped > 0 {
                    warn!(
                        "{}: skipped {} nonpositive {} point(s) on a log axis",
                        self.kind.file_name(),
                        skipped,
                        series.column
                    );
                }

                let markers: Vec<(f64, f64)> = points
                    .iter()
                    .copied()
                    .filter(|&(x, y)| self.x.in_window(x) && self.y.in_window(y))
                    .collect();
                debug!(
                    "{}: {} has {} point(s), {} inside the window",
                    self.kind.file_name(),
                    series.column,
                    points.len(),
                    markers.len()
                );

                PlottedSeries {
                    algorithm,
                    style: algorithm.style(),
                    paths: self.clip_polyline(&points),
                    points,
                    markers,
                }
            })
            .collect()
    }

    /// Pieces of the polyline through `points` that lie inside the axis windows.
    ///
    /// Segments crossing a window edge are cut at the edge in view space, so a
    /// straight line on screen stays straight. A segment that leaves and later
    /// re-enters the window starts a new piece.
    pub fn clip_polyline(&self, points: &[(f64, f64)]) -> Vec<Vec<(f64, f64)>> {
        let x_window = self.x.view_window();
        let y_window = self.y.view_window();
        let view = |&(x, y): &(f64, f64)| (self.x.to_view(x), self.y.to_view(y));

        let mut paths: Vec<Vec<(f64, f64)>> = Vec::new();
        let mut open = false;
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (va, vb) = (view(&a), view(&b));
            let Some((t0, t1)) = clip_segment(va, vb, x_window, y_window) else {
                open = false;
                continue;
            };
            if t0 >= t1 {
                open = false;
                continue;
            }

            let at = |t: f64| {
                (
                    self.x.from_view(va.0 + t * (vb.0 - va.0)),
                    self.y.from_view(va.1 + t * (vb.1 - va.1)),
                )
            };
            // Keep the original coordinates where the segment is not cut
            let start = if t0 == 0.0 { a } else { at(t0) };
            let end = if t1 == 1.0 { b } else { at(t1) };

            match paths.last_mut() {
                Some(path) if open && t0 == 0.0 => path.push(end),
                _ => paths.push(vec![start, end]),
            }
            open = t1 == 1.0;
        }
        paths
    }
}

/// Liang-Barsky clip of the segment `a -> b` against a rectangle.
///
/// Returns the parameter interval `[t0, t1]` of the visible part, or `None`
/// when the segment misses the rectangle entirely.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    (x_lo, x_hi): (f64, f64),
    (y_lo, y_hi): (f64, f64),
) -> Option<(f64, f64)> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;

    for (p, q) in [
        (-dx, a.0 - x_lo),
        (dx, x_hi - a.0),
        (-dy, a.1 - y_lo),
        (dy, y_hi - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((t0, t1))
}

/// Generate all charts into `output_dir`, returning the written paths
pub fn generate_plots<P: AsRef<Path>>(dataset: &Dataset, output_dir: P) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let mut generated = Vec::new();
    for kind in ChartKind::ALL {
        let path = output_dir.join(kind.file_name());
        render_chart(dataset, kind, &path)
            .with_context(|| format!("Failed to render {}", path.display()))?;
        info!("Wrote {}", path.display());
        generated.push(path);
    }

    Ok(generated)
}

/// Render a single chart to an SVG file
pub fn render_chart(dataset: &Dataset, kind: ChartKind, path: &Path) -> Result<()> {
    let config = kind.config();
    let plotted = config.plot_series(dataset);

    let (x_lo, x_hi) = config
        .x
        .bounds(plotted.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
    let (y_lo, y_hi) = config
        .y
        .bounds(plotted.iter().flat_map(|s| s.points.iter().map(|p| p.1)));

    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let y_span = (y_lo, y_hi);
    match (config.x.scale, config.y.scale) {
        (AxisScale::Linear, AxisScale::Linear) => {
            draw_chart(&root, &config, &plotted, y_span, x_lo..x_hi, y_lo..y_hi)?
        }
        (AxisScale::Linear, AxisScale::Log) => draw_chart(
            &root,
            &config,
            &plotted,
            y_span,
            x_lo..x_hi,
            (y_lo..y_hi).log_scale(),
        )?,
        (AxisScale::Log, AxisScale::Linear) => draw_chart(
            &root,
            &config,
            &plotted,
            y_span,
            (x_lo..x_hi).log_scale(),
            y_lo..y_hi,
        )?,
        (AxisScale::Log, AxisScale::Log) => draw_chart(
            &root,
            &config,
            &plotted,
            y_span,
            (x_lo..x_hi).log_scale(),
            (y_lo..y_hi).log_scale(),
        )?,
    }

    root.present()?;
    Ok(())
}

/// Draw axes, reference lines, series and legend onto `root`
fn draw_chart<XR, YR>(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    config: &ChartConfig,
    plotted: &[PlottedSeries],
    (y_lo, y_hi): (f64, f64),
    x_range: XR,
    y_range: YR,
) -> Result<()>
where
    XR: AsRangedCoord<Value = f64>,
    YR: AsRangedCoord<Value = f64>,
    XR::CoordDescType: ValueFormatter<f64>,
    YR::CoordDescType: ValueFormatter<f64>,
{
    let mut chart = ChartBuilder::on(root)
        .caption(config.title, ("sans-serif", TITLE_FONT_SIZE))
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(120)
        .build_cartesian_2d(x_range, y_range)?;

    let x_label = |v: &f64| config.x.tick_label(v);
    let y_label = |v: &f64| config.y.tick_label(v);

    // Major grid only
    chart
        .configure_mesh()
        .x_desc(config.x.desc)
        .y_desc(config.y.desc)
        .axis_desc_style(("sans-serif", AXIS_DESC_FONT_SIZE))
        .label_style(("sans-serif", TICK_FONT_SIZE))
        .bold_line_style(BLACK.mix(GRID_ALPHA))
        .light_line_style(WHITE)
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .draw()?;

    for &x in config.reference_lines {
        chart.draw_series(DashedLineSeries::new(
            vec![(x, y_lo), (x, y_hi)],
            12,
            8,
            REFERENCE_LINE_COLOR.stroke_width(LINE_WIDTH),
        ))?;
    }

    for series in plotted {
        let color = series.style.color.mix(config.series_alpha);

        let line = color.stroke_width(LINE_WIDTH);
        let anno = chart.draw_series(
            series
                .paths
                .iter()
                .map(|path| PathElement::new(path.clone(), line)),
        )?;
        anno.label(series.style.label);
        attach_legend(anno, series.style, config.series_alpha);

        draw_markers(&mut chart, &series.markers, series.style.marker, color.filled())?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", LEGEND_FONT_SIZE))
        .position(config.kind.legend_position())
        .draw()?;

    Ok(())
}

/// Legend entry: a short line with the series marker in the middle
fn attach_legend<'a>(anno: &mut SeriesAnno<'a, SVGBackend<'a>>, style: &AlgorithmStyle, alpha: f64) {
    let line = style.color.mix(alpha).stroke_width(LINE_WIDTH);
    let fill = style.color.mix(alpha).filled();
    let s = MARKER_SIZE;

    match style.marker {
        MarkerShape::Circle => {
            anno.legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (24, 0)], line)
                    + Circle::new((12, 0), s, fill)
            });
        }
        MarkerShape::Square => {
            anno.legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (24, 0)], line)
                    + Rectangle::new([(12 - s, -s), (12 + s, s)], fill)
            });
        }
        MarkerShape::Triangle => {
            anno.legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (24, 0)], line)
                    + TriangleMarker::new((12, 0), s, fill)
            });
        }
        MarkerShape::Diamond => {
            anno.legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (24, 0)], line)
                    + Polygon::new(vec![(12, -s), (12 + s, 0), (12, s), (12 - s, 0)], fill)
            });
        }
    }
}

/// Draw one marker per point in the series' marker shape
fn draw_markers<X, Y>(
    chart: &mut ChartContext<'_, SVGBackend<'_>, Cartesian2d<X, Y>>,
    points: &[(f64, f64)],
    shape: MarkerShape,
    style: ShapeStyle,
) -> Result<()>
where
    X: Ranged<ValueType = f64>,
    Y: Ranged<ValueType = f64>,
{
    let s = MARKER_SIZE;
    match shape {
        MarkerShape::Circle => {
            chart.draw_series(points.iter().map(|&c| Circle::new(c, s, style)))?;
        }
        MarkerShape::Square => {
            chart.draw_series(
                points
                    .iter()
                    .map(|&c| EmptyElement::at(c) + Rectangle::new([(-s, -s), (s, s)], style)),
            )?;
        }
        MarkerShape::Triangle => {
            chart.draw_series(points.iter().map(|&c| TriangleMarker::new(c, s, style)))?;
        }
        MarkerShape::Diamond => {
            chart.draw_series(points.iter().map(|&c| {
                EmptyElement::at(c) + Polygon::new(vec![(0, -s), (s, 0), (0, s), (-s, 0)], style)
            }))?;
        }
    }
    Ok(())
}
