use anyhow::{bail, Result};
use log::{debug, warn};
use plotters::coord::ranged1d::Ranged;
use plotters::coord::types::RangedCoordusize;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use std::path::{Path, PathBuf};

use crate::analysis::RocSummary;
use crate::config::PlotOptions;
use crate::data::InferenceTable;
use crate::figure::{save_figure, Canvas};
use crate::histogram::{uniform_edges, Hist1D, Hist2D};
use crate::history::{subsample, TrainingHistory, LOSS_CURVE_STRIDE};

/// Score bin edges of the 2D correlation histogram.
pub const CORRELATION_SCORE_EDGES: [f64; 7] = [0.0, 0.05, 0.1, 0.2, 0.4, 0.7, 1.0];

pub const SCORE_HISTOGRAM_BINS: usize = 100;

// matplotlib's default cycle, so the plots match the rest of the analysis.
const C0: RGBColor = RGBColor(31, 119, 180);
const C1: RGBColor = RGBColor(255, 127, 14);

const FONT: &str = "sans-serif";

/// Viridis colormap - maps value in [0, 1] to RGB, clamping outside values
fn viridis_color(t: f64) -> RGBColor {
    ColorMap::<RGBColor, f64>::get_color(&ViridisRGB, t.clamp(0.0, 1.0))
}

/// Five-pointed star around the origin, in pixel offsets.
fn star_vertices(radius: i32) -> Vec<(i32, i32)> {
    (0..10)
        .map(|k| {
            let r = if k % 2 == 0 { radius as f64 } else { radius as f64 * 0.4 };
            let angle = std::f64::consts::PI * (k as f64 / 5.0 - 0.5);
            ((r * angle.cos()).round() as i32, (r * angle.sin()).round() as i32)
        })
        .collect()
}

/// Triangle with its apex pointing down (pixel y grows downwards).
fn down_triangle_vertices(radius: i32) -> Vec<(i32, i32)> {
    vec![(-radius, -radius / 2), (radius, -radius / 2), (0, radius)]
}

fn shifted(vertices: &[(i32, i32)], (x, y): (i32, i32)) -> Vec<(i32, i32)> {
    vertices.iter().map(|(dx, dy)| (x + dx, y + dy)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

/// One line on the loss plot.
#[derive(Debug, Clone)]
pub struct LossCurve {
    pub label: &'static str,
    pub color: RGBColor,
    pub style: LineStyle,
    pub points: Vec<(usize, f64)>,
}

fn loss_curve(label: &'static str, color: RGBColor, style: LineStyle, values: &[f64]) -> LossCurve {
    LossCurve {
        label,
        color,
        style,
        points: subsample(values, LOSS_CURVE_STRIDE),
    }
}

/// Six curves: test/train colour, total/BCE/DisCo line style.
pub fn loss_curves(history: &TrainingHistory) -> Vec<LossCurve> {
    vec![
        loss_curve("L_test = L_BCE + λ dCorr", C0, LineStyle::Solid, &history.test_loss),
        loss_curve("L_train = L_BCE + λ dCorr", C1, LineStyle::Solid, &history.train_loss),
        loss_curve("L_BCE (test)", C0, LineStyle::Dashed, &history.test_bce),
        loss_curve("L_BCE (train)", C1, LineStyle::Dashed, &history.train_bce),
        loss_curve("λ dCorr² (test)", C0, LineStyle::Dotted, &history.test_disco),
        loss_curve("λ dCorr² (train)", C1, LineStyle::Dotted, &history.train_disco),
    ]
}

/// Plot the loss curves and mark the selected epoch.
pub fn plot_loss_curve(
    history: &TrainingHistory,
    options: &PlotOptions,
    plots_dir: &Path,
) -> Result<PathBuf> {
    let curves = loss_curves(history);
    save_figure(plots_dir, "loss", (1600, 1200), |root| {
        draw_loss_curve(root, &curves, options)
    })
}

/// Exclusive end of the epoch axis, wide enough for every point and the
/// selected epoch.
fn epoch_axis_end(curves: &[LossCurve], epoch: usize) -> usize {
    curves
        .iter()
        .flat_map(|c| c.points.iter())
        .map(|(e, _)| *e)
        .max()
        .unwrap_or(1)
        .max(epoch)
        .saturating_add(1)
}

fn draw_loss_curve(root: &Canvas<'_>, curves: &[LossCurve], options: &PlotOptions) -> Result<()> {
    let max_epoch = epoch_axis_end(curves, options.epoch);

    let values: Vec<f64> = curves
        .iter()
        .flat_map(|c| c.points.iter())
        .map(|(_, v)| *v)
        .filter(|v| v.is_finite())
        .collect();

    if options.loss_logy {
        let positive: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
        if positive.len() < values.len() {
            warn!(
                "{} non-positive loss values are not shown on the log-scale loss curve",
                values.len() - positive.len()
            );
        }
        if positive.is_empty() {
            bail!("log-scale loss curve needs at least one positive value");
        }
        let lo = positive.iter().copied().fold(f64::INFINITY, f64::min) * 0.5;
        let hi = positive.iter().copied().fold(0.0f64, f64::max) * 2.0;

        let mut chart = ChartBuilder::on(root)
            .margin(30)
            .x_label_area_size(80)
            .y_label_area_size(120)
            .build_cartesian_2d(1usize..max_epoch, (lo..hi).log_scale())?;

        chart
            .configure_mesh()
            .x_desc("Epoch")
            .y_desc("Avg. Loss")
            .axis_desc_style((FONT, 32))
            .label_style((FONT, 24))
            .draw()?;

        draw_loss_series(&mut chart, curves, options.epoch, (lo, hi), true)
    } else {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min).min(0.0);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let hi = if hi > lo { hi + 0.05 * (hi - lo) } else { lo + 1.0 };

        let mut chart = ChartBuilder::on(root)
            .margin(30)
            .x_label_area_size(80)
            .y_label_area_size(120)
            .build_cartesian_2d(1usize..max_epoch, lo..hi)?;

        chart
            .configure_mesh()
            .x_desc("Epoch")
            .y_desc("Avg. Loss")
            .axis_desc_style((FONT, 32))
            .label_style((FONT, 24))
            .draw()?;

        draw_loss_series(&mut chart, curves, options.epoch, (lo, hi), false)
    }
}

fn draw_loss_series<'a, 'b: 'a, Y>(
    chart: &mut ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordusize, Y>>,
    curves: &[LossCurve],
    epoch: usize,
    (lo, hi): (f64, f64),
    positive_only: bool,
) -> Result<()>
where
    Y: Ranged<ValueType = f64>,
{
    for curve in curves {
        let points: Vec<(usize, f64)> = curve
            .points
            .iter()
            .copied()
            .filter(|(_, v)| v.is_finite() && (!positive_only || *v > 0.0))
            .collect();
        let style = curve.color.stroke_width(3);

        let anno = match curve.style {
            LineStyle::Solid => chart.draw_series(LineSeries::new(points, style))?,
            LineStyle::Dashed => {
                chart.draw_series(DashedLineSeries::new(points, 14, 8, style))?
            }
            LineStyle::Dotted => chart.draw_series(DashedLineSeries::new(points, 3, 6, style))?,
        };
        anno.label(curve.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], style));
    }

    // Selected epoch
    chart.draw_series(LineSeries::new(
        vec![(epoch, lo), (epoch, hi)],
        BLACK.mix(0.25).stroke_width(2),
    ))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, 24))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

pub fn plot_roc_curve(summary: &RocSummary, epoch: usize, plots_dir: &Path) -> Result<PathBuf> {
    save_figure(
        plots_dir,
        &format!("roc_epoch{}", epoch),
        (1200, 1200),
        |root| draw_roc_curve(root, summary),
    )
}

fn draw_roc_curve(root: &Canvas<'_>, summary: &RocSummary) -> Result<()> {
    let mut chart = ChartBuilder::on(root)
        .margin(30)
        .x_label_area_size(80)
        .y_label_area_size(110)
        .build_cartesian_2d(0f64..1f64, 0f64..1.02f64)?;

    chart
        .configure_mesh()
        .x_desc("Background efficiency")
        .y_desc("Signal efficiency")
        .axis_desc_style((FONT, 32))
        .label_style((FONT, 24))
        .draw()?;

    for (name, curve, color) in [("train", &summary.train, C0), ("test", &summary.test, C1)] {
        let style = color.stroke_width(3);
        chart
            .draw_series(LineSeries::new(
                curve.points.iter().map(|p| (p.fpr, p.tpr)),
                style,
            ))?
            .label(format!("DisCo {} (AUC = {:.2})", name, curve.auc))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], style));
    }

    let mut yields = summary.yields.clone();
    yields.sort_by(|a, b| b.signal_events.cmp(&a.signal_events));

    for yp in &yields {
        let coord = (yp.point.fpr, yp.point.tpr);
        let label = format!("{} sig ({:.2} bkg)", yp.signal_events, yp.background_events);

        match yp.signal_events {
            5 => {
                let style = CYAN.filled();
                let star = star_vertices(11);
                let legend_star = star.clone();
                chart
                    .draw_series(std::iter::once(
                        EmptyElement::at(coord) + Polygon::new(star, style),
                    ))?
                    .label(label)
                    .legend(move |(x, y)| Polygon::new(shifted(&legend_star, (x + 15, y)), style));
            }
            4 => {
                let style = BLUE.filled();
                let triangle = down_triangle_vertices(9);
                let legend_triangle = triangle.clone();
                chart
                    .draw_series(std::iter::once(
                        EmptyElement::at(coord) + Polygon::new(triangle, style),
                    ))?
                    .label(label)
                    .legend(move |(x, y)| {
                        Polygon::new(shifted(&legend_triangle, (x + 15, y)), style)
                    });
            }
            3 => {
                let style = MAGENTA.filled();
                chart
                    .draw_series(std::iter::once(TriangleMarker::new(coord, 9, style)))?
                    .label(label)
                    .legend(move |(x, y)| TriangleMarker::new((x + 15, y), 9, style));
            }
            2 => {
                let style = RED.filled();
                chart
                    .draw_series(std::iter::once(Circle::new(coord, 8, style)))?
                    .label(label)
                    .legend(move |(x, y)| Circle::new((x + 15, y), 8, style));
            }
            _ => {
                let style = YELLOW.mix(0.9).filled();
                chart
                    .draw_series(std::iter::once(
                        EmptyElement::at(coord) + Rectangle::new([(-7, -7), (7, 7)], style),
                    ))?
                    .label(label)
                    .legend(move |(x, y)| Rectangle::new([(x + 8, y - 7), (x + 22, y + 7)], style));
            }
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .label_font((FONT, 24))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

/// Test-split score distributions, each normalized to unit area within its
/// class. Returns `(signal, background)`.
pub fn score_histograms(test: &InferenceTable) -> Result<(Hist1D, Hist1D)> {
    let edges = uniform_edges(0.0, 1.0, SCORE_HISTOGRAM_BINS);
    let mut signal = Hist1D::new(edges.clone())?;
    let mut background = Hist1D::new(edges)?;

    let signal_total = test.signal_yield();
    let background_total = test.background_yield();
    if signal_total <= 0.0 {
        bail!("test split has no signal weight to normalize the score histogram");
    }
    if background_total <= 0.0 {
        bail!("test split has no background weight to normalize the score histogram");
    }

    for row in test.signal() {
        signal.fill(row.score, row.weight / signal_total);
    }
    for row in test.background() {
        background.fill(row.score, row.weight / background_total);
    }

    debug!(
        "score histograms: sig integral={:.4}, bkg integral={:.4}",
        signal.integral(),
        background.integral()
    );
    Ok((signal, background))
}

pub fn plot_score_histogram(test: &InferenceTable, epoch: usize, plots_dir: &Path) -> Result<PathBuf> {
    let (signal, background) = score_histograms(test)?;
    save_figure(
        plots_dir,
        &format!("scores_epoch{}", epoch),
        (1200, 1200),
        |root| draw_score_histogram(root, &signal, &background),
    )
}

/// Outline of a histogram, with empty bins dropped to `floor`.
fn step_outline(hist: &Hist1D, floor: f64) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(2 * hist.counts().len() + 2);
    if let Some(&first) = hist.edges().first() {
        points.push((first, floor));
    }
    for (lo, hi, content) in hist.bins() {
        let y = content.max(floor);
        points.push((lo, y));
        points.push((hi, y));
    }
    if let Some(&last) = hist.edges().last() {
        points.push((last, floor));
    }
    points
}

fn draw_score_histogram(root: &Canvas<'_>, signal: &Hist1D, background: &Hist1D) -> Result<()> {
    let contents = signal.counts().iter().chain(background.counts());
    let max = contents.clone().copied().fold(0.0f64, f64::max);
    let min_positive = contents
        .copied()
        .filter(|c| *c > 0.0)
        .fold(f64::INFINITY, f64::min);

    let hi = if max > 0.0 { max * 2.0 } else { 1.0 };
    let lo = if min_positive.is_finite() { min_positive * 0.5 } else { hi * 1e-4 };

    let mut chart = ChartBuilder::on(root)
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(110)
        .build_cartesian_2d(0f64..1f64, (lo..hi).log_scale())?;

    chart
        .configure_mesh()
        .x_desc("score")
        .y_desc("a.u.")
        .axis_desc_style((FONT, 28))
        .label_style((FONT, 20))
        .draw()?;

    for (label, hist, color) in [("test (sig)", signal, C0), ("test (bkg)", background, C1)] {
        let style = color.stroke_width(2);
        chart
            .draw_series(LineSeries::new(step_outline(hist, lo), style))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], style));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, 20))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

/// Weighted (score, DisCo target) histogram of test background, normalized
/// to the test background yield and optionally rebinned.
pub fn correlation_histogram(test: &InferenceTable, options: &PlotOptions) -> Result<Hist2D> {
    let background_total = test.background_yield();
    if background_total <= 0.0 {
        bail!("test split has no background weight for the correlation histogram");
    }

    let mut hist = Hist2D::new(CORRELATION_SCORE_EDGES.to_vec(), options.target_edges())?;
    for row in test.background() {
        hist.fill(row.score, row.disco_target, row.weight / background_total);
    }

    if options.corr2d_rebin > 0 {
        hist = hist.rebin(options.corr2d_rebin);
    }
    debug!(
        "correlation histogram: {:?} bins, integral={:.4}",
        hist.shape(),
        hist.integral()
    );
    Ok(hist)
}

/// Axis titles for a correlation plot.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationLabels<'a> {
    pub x: &'a str,
    pub y: &'a str,
    pub profile: &'a str,
}

pub const SCORE_VS_TARGET: CorrelationLabels<'static> = CorrelationLabels {
    x: "ABCDNet score",
    y: "DisCo target",
    profile: "DisCo target profile",
};

pub const TARGET_VS_SCORE: CorrelationLabels<'static> = CorrelationLabels {
    x: "DisCo target",
    y: "ABCDNet score",
    profile: "ABCDNet score profile",
};

pub fn plot_correlation_histogram(
    hist: &Hist2D,
    labels: CorrelationLabels<'_>,
    stem: &str,
    plots_dir: &Path,
) -> Result<PathBuf> {
    save_figure(plots_dir, stem, (1300, 1200), |root| {
        draw_correlation_histogram(root, hist, labels)
    })
}

fn draw_correlation_histogram(
    root: &Canvas<'_>,
    hist: &Hist2D,
    labels: CorrelationLabels<'_>,
) -> Result<()> {
    let (main_area, colorbar_area) = root.split_horizontally(1120);

    let x_range = hist.x_edges()[0]..hist.x_edges()[hist.x_edges().len() - 1];
    let y_range = hist.y_edges()[0]..hist.y_edges()[hist.y_edges().len() - 1];
    let max_count = hist.max_count();
    let scale = if max_count > 0.0 { max_count } else { 1.0 };

    let mut chart = ChartBuilder::on(&main_area)
        .margin(30)
        .x_label_area_size(80)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(labels.x)
        .y_desc(labels.y)
        .axis_desc_style((FONT, 32))
        .label_style((FONT, 24))
        .draw()?;

    // Empty bins are drawn too, at the bottom of the colour scale.
    chart.draw_series(hist.bins().into_iter().map(|(x0, x1, y0, y1, content)| {
        Rectangle::new([(x0, y0), (x1, y1)], viridis_color(content / scale).filled())
    }))?;

    let profile = hist.profile();
    let marker = WHITE.filled();
    chart.draw_series(profile.iter().map(|p| {
        ErrorBar::new_vertical(p.center, p.mean - p.error, p.mean, p.mean + p.error, WHITE.stroke_width(2), 10)
    }))?;
    chart
        .draw_series(profile.iter().map(|p| Circle::new((p.center, p.mean), 6, marker)))?
        .label(labels.profile)
        .legend(move |(x, y)| Circle::new((x + 15, y), 6, marker));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, 24).into_font().color(&WHITE))
        .background_style(&BLACK.mix(0.4))
        .border_style(&WHITE)
        .draw()?;

    draw_colorbar(&colorbar_area, scale)
}

fn draw_colorbar(area: &Canvas<'_>, max_count: f64) -> Result<()> {
    const STEPS: usize = 100;

    let mut chart = ChartBuilder::on(area)
        .margin_top(30)
        .margin_bottom(110)
        .margin_right(10)
        .y_label_area_size(100)
        .build_cartesian_2d(0f64..1f64, 0f64..max_count)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .label_style((FONT, 20))
        .draw()?;

    chart.draw_series((0..STEPS).map(|i| {
        let lo = max_count * i as f64 / STEPS as f64;
        let hi = max_count * (i + 1) as f64 / STEPS as f64;
        Rectangle::new(
            [(0.0, lo), (1.0, hi)],
            viridis_color((i as f64 + 0.5) / STEPS as f64).filled(),
        )
    }))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InferenceRow;

    fn event(truth: f64, score: f64, weight: f64, disco_target: f64) -> InferenceRow {
        InferenceRow {
            truth,
            score,
            weight,
            disco_target,
        }
    }

    fn balanced_table() -> InferenceTable {
        InferenceTable::new(vec![
            event(1.0, 0.95, 0.5, 2.0),
            event(1.0, 0.85, 1.5, 3.0),
            event(1.0, 0.65, 1.0, 4.0),
            event(1.0, 0.30, 1.0, 1.0),
            event(1.0, 0.10, 1.0, 5.0),
            event(0.0, 0.70, 2.0, 6.5),
            event(0.0, 0.45, 3.0, 2.5),
            event(0.0, 0.15, 1.0, 7.5),
            event(0.0, 0.03, 4.0, 0.5),
            event(0.0, 0.00, 2.0, 9.0),
        ])
    }

    #[test]
    fn viridis_endpoints_are_dark_and_bright() {
        let dark = viridis_color(0.0);
        let bright = viridis_color(1.0);
        assert!(dark.1 < 10);
        assert!(bright.0 > 200 && bright.1 > 200);
        assert_eq!(viridis_color(-3.0), dark);
    }

    #[test]
    fn viridis_midpoint_is_teal() {
        let mid = viridis_color(0.5);
        assert!(mid.1 > mid.0 && mid.2 > mid.0, "{:?}", mid);
    }

    #[test]
    fn yield_markers_are_distinguishable() {
        let star = star_vertices(10);
        assert_eq!(star.len(), 10);
        assert_eq!(star[0], (0, -10));

        // Apex below the base, unlike the upward marker for three events.
        let triangle = down_triangle_vertices(9);
        assert!(triangle.iter().all(|&(_, y)| y <= 9));
        assert_eq!(triangle[2], (0, 9));
        assert!(triangle[0].1 < 0 && triangle[1].1 < 0);

        assert_eq!(shifted(&triangle, (100, 50))[2], (100, 59));
    }

    #[test]
    fn loss_curve_renders_in_both_scales() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let decay: Vec<f64> = (1..=30).map(|e| 1.0 / e as f64).collect();
        let history = TrainingHistory {
            train_loss: decay.clone(),
            test_loss: decay.clone(),
            train_bce: decay.clone(),
            test_bce: decay.clone(),
            train_disco: decay.clone(),
            test_disco: decay,
        };

        for loss_logy in [false, true] {
            let options = PlotOptions {
                epoch: 12,
                loss_logy,
                ..PlotOptions::default()
            };
            let png = plot_loss_curve(&history, &options, temp_dir.path()).unwrap();
            assert!(png.exists());
            assert!(temp_dir.path().join("loss.pdf").exists());
        }
    }

    #[test]
    fn epoch_axis_covers_selected_epoch() {
        let curves = vec![loss_curve("L", C0, LineStyle::Solid, &[1.0; 25])];

        assert_eq!(epoch_axis_end(&curves, 5), 22);
        assert_eq!(epoch_axis_end(&curves, 40), 41);
        assert_eq!(epoch_axis_end(&curves, usize::MAX), usize::MAX);
        assert_eq!(epoch_axis_end(&[], 0), 2);
    }

    #[test]
    fn loss_curves_pair_split_colour_with_component_style() {
        let ramp: Vec<f64> = (1..=100).map(|e| e as f64).collect();
        let history = TrainingHistory {
            train_loss: ramp.clone(),
            test_loss: ramp.clone(),
            train_bce: ramp.clone(),
            test_bce: ramp.clone(),
            train_disco: ramp.clone(),
            test_disco: ramp,
        };

        let curves = loss_curves(&history);
        assert_eq!(curves.len(), 6);
        for curve in &curves {
            assert_eq!(curve.points.len(), 10);
            assert_eq!(curve.points[0], (1, 1.0));
        }
        assert!(curves.iter().filter(|c| c.color == C0).count() == 3);
        assert_eq!(curves[2].style, LineStyle::Dashed);
        assert_eq!(curves[5].style, LineStyle::Dotted);
    }

    #[test]
    fn score_histograms_are_unit_normalized() {
        let (signal, background) = score_histograms(&balanced_table()).unwrap();
        assert_eq!(signal.counts().len(), SCORE_HISTOGRAM_BINS);
        assert!((signal.integral() - 1.0).abs() < 1e-12);
        assert!((background.integral() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn score_histograms_require_both_classes() {
        let only_signal = InferenceTable::new(vec![event(1.0, 0.5, 1.0, 0.0)]);
        assert!(score_histograms(&only_signal).is_err());
    }

    #[test]
    fn correlation_histogram_uses_background_only() {
        let options = PlotOptions::default();
        let hist = correlation_histogram(&balanced_table(), &options).unwrap();

        assert_eq!(hist.shape(), (6, 20));
        // The 9.0 target falls outside the default [0, 8] range.
        assert!((hist.integral() - 10.0 / 12.0).abs() < 1e-12);

        let rebinned = correlation_histogram(
            &balanced_table(),
            &PlotOptions {
                corr2d_rebin: 2,
                ..options
            },
        )
        .unwrap();
        assert_eq!(rebinned.shape(), (3, 10));
        assert!((rebinned.integral() - hist.integral()).abs() < 1e-12);
    }

    #[test]
    fn step_outline_closes_on_floor() {
        let mut hist = Hist1D::new(vec![0.0, 0.5, 1.0]).unwrap();
        hist.fill(0.25, 0.4);

        let outline = step_outline(&hist, 1e-3);
        assert_eq!(
            outline,
            vec![(0.0, 1e-3), (0.0, 0.4), (0.5, 0.4), (0.5, 1e-3), (1.0, 1e-3), (1.0, 1e-3)]
        );
    }
}
