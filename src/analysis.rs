use anyhow::{bail, Result};
use log::{debug, warn};

use crate::data::{InferenceRow, InferenceTable};

/// Expected signal yields at which operating points are marked on the ROC curve.
pub const SIGNAL_YIELD_TARGETS: [u32; 5] = [1, 2, 3, 4, 5];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocPoint {
    /// Events with score >= threshold are selected.
    pub threshold: f64,
    /// Background efficiency.
    pub fpr: f64,
    /// Signal efficiency.
    pub tpr: f64,
}

/// Weighted ROC curve, ordered by descending threshold (ascending FPR/TPR).
#[derive(Debug, Clone)]
pub struct RocCurve {
    pub points: Vec<RocPoint>,
    pub auc: f64,
}

impl RocCurve {
    /// Weighted ROC curve from the signal/background rows of `table`.
    pub fn from_table(table: &InferenceTable) -> Result<Self> {
        let labelled: Vec<&InferenceRow> = table
            .rows()
            .iter()
            .filter(|row| row.is_signal() || row.is_background())
            .collect();
        let scores: Vec<f64> = labelled.iter().map(|row| row.score).collect();
        let labels: Vec<bool> = labelled.iter().map(|row| row.is_signal()).collect();
        let weights: Vec<f64> = labelled.iter().map(|row| row.weight).collect();

        roc_curve(&scores, &labels, &weights)
    }

    pub fn fpr(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.fpr).collect()
    }

    pub fn tpr(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.tpr).collect()
    }

    /// First point in sweep order whose signal efficiency reaches `min_tpr`.
    pub fn first_reaching(&self, min_tpr: f64) -> Option<RocPoint> {
        self.points.iter().copied().find(|p| p.tpr >= min_tpr)
    }
}

/// Sweep thresholds over the distinct scores in descending order and
/// accumulate weighted true/false positives.
///
/// Non-finite scores or weights are rejected and zero-weight events are
/// ignored. A leading (0, 0) point sits at an infinite threshold, and points
/// collinear with both neighbours are dropped since they do not change the
/// curve.
pub fn roc_curve(scores: &[f64], labels: &[bool], weights: &[f64]) -> Result<RocCurve> {
    if scores.len() != labels.len() || scores.len() != weights.len() {
        bail!(
            "length mismatch: {} scores, {} labels, {} weights",
            scores.len(),
            labels.len(),
            weights.len()
        );
    }

    if let Some(i) = scores.iter().position(|s| !s.is_finite()) {
        bail!("score {} at index {} is not finite", scores[i], i);
    }
    if let Some(i) = weights.iter().position(|w| !w.is_finite()) {
        bail!("weight {} at index {} is not finite", weights[i], i);
    }

    let mut indices: Vec<usize> = (0..scores.len()).filter(|&i| weights[i] != 0.0).collect();
    indices.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut thresholds = Vec::new();
    let mut tps = Vec::new();
    let mut fps = Vec::new();
    let mut tp = 0.0;
    let mut fp = 0.0;

    let mut i = 0;
    while i < indices.len() {
        let current_score = scores[indices[i]];
        while i < indices.len() && scores[indices[i]] == current_score {
            let idx = indices[i];
            if labels[idx] {
                tp += weights[idx];
            } else {
                fp += weights[idx];
            }
            i += 1;
        }
        thresholds.push(current_score);
        tps.push(tp);
        fps.push(fp);
    }

    let total_pos = tps.last().copied().unwrap_or(0.0);
    let total_neg = fps.last().copied().unwrap_or(0.0);
    if total_pos <= 0.0 {
        bail!("ROC curve is undefined without signal weight");
    }
    if total_neg <= 0.0 {
        bail!("ROC curve is undefined without background weight");
    }

    let keep = non_collinear_indices(&tps, &fps);

    let mut points = Vec::with_capacity(keep.len() + 1);
    points.push(RocPoint {
        threshold: f64::INFINITY,
        fpr: 0.0,
        tpr: 0.0,
    });
    for idx in keep {
        points.push(RocPoint {
            threshold: thresholds[idx],
            fpr: fps[idx] / total_neg,
            tpr: tps[idx] / total_pos,
        });
    }

    let mut curve = RocCurve { points, auc: 0.0 };
    curve.auc = trapezoidal_auc(&curve.fpr(), &curve.tpr());
    Ok(curve)
}

/// Indices where either cumulative sum bends, plus both endpoints.
fn non_collinear_indices(tps: &[f64], fps: &[f64]) -> Vec<usize> {
    let n = tps.len();
    if n <= 2 {
        return (0..n).collect();
    }

    let mut keep = vec![0];
    for i in 1..n - 1 {
        let d2_tp = tps[i + 1] - 2.0 * tps[i] + tps[i - 1];
        let d2_fp = fps[i + 1] - 2.0 * fps[i] + fps[i - 1];
        if d2_tp != 0.0 || d2_fp != 0.0 {
            keep.push(i);
        }
    }
    keep.push(n - 1);
    keep
}

/// Trapezoidal integral of `y` over `x`.
pub fn trapezoidal_auc(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[1] + ys[0]) / 2.0)
        .sum()
}

/// Operating point where the selection expects `signal_events` signal events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldPoint {
    pub signal_events: u32,
    pub point: RocPoint,
    pub background_events: f64,
}

/// For each target, the first ROC point whose efficiency times
/// `total_signal` reaches it. Targets the curve never reaches are omitted.
pub fn yield_points(
    curve: &RocCurve,
    total_signal: f64,
    total_background: f64,
    targets: &[u32],
) -> Vec<YieldPoint> {
    targets
        .iter()
        .filter_map(|&signal_events| {
            let min_tpr = signal_events as f64 / total_signal;
            let point = curve.first_reaching(min_tpr)?;
            let background_events = point.fpr * total_background;
            debug!(
                "{} sig: threshold={:.4} tpr={:.4} fpr={:.4} bkg={:.2}",
                signal_events, point.threshold, point.tpr, point.fpr, background_events
            );
            Some(YieldPoint {
                signal_events,
                point,
                background_events,
            })
        })
        .collect()
}

/// ROC curves for both splits plus the signal-yield operating points of the
/// test curve.
#[derive(Debug, Clone)]
pub struct RocSummary {
    pub train: RocCurve,
    pub test: RocCurve,
    pub yields: Vec<YieldPoint>,
}

impl RocSummary {
    /// Yields are normalized to the combined train+test totals.
    pub fn compute(train: &InferenceTable, test: &InferenceTable) -> Result<Self> {
        let train_curve = RocCurve::from_table(train)?;
        let test_curve = RocCurve::from_table(test)?;

        let total = test.concat(train);
        let total_signal = total.signal_yield();
        let total_background = total.background_yield();
        debug!(
            "ROC: train AUC={:.4}, test AUC={:.4}, total sig={:.3}, total bkg={:.3}",
            train_curve.auc, test_curve.auc, total_signal, total_background
        );

        let yields = yield_points(
            &test_curve,
            total_signal,
            total_background,
            &SIGNAL_YIELD_TARGETS,
        );
        for target in SIGNAL_YIELD_TARGETS {
            if !yields.iter().any(|y| y.signal_events == target) {
                warn!(
                    "test ROC curve never reaches {} expected signal events (total {:.3})",
                    target, total_signal
                );
            }
        }

        Ok(Self {
            train: train_curve,
            test: test_curve,
            yields,
        })
    }
}
