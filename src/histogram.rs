//! Weighted histograms with explicit bin edges.
//!
//! Binning follows the usual convention: bins are half-open `[lo, hi)`
//! except the last one, which also contains its upper edge. Entries outside
//! the edges are dropped.

use anyhow::{bail, Result};

fn validate_edges(axis: &str, edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        bail!("{} axis requires at least 2 bin edges, got {}", axis, edges.len());
    }
    for (i, edge) in edges.iter().enumerate() {
        if !edge.is_finite() {
            bail!("{} axis edge[{}] must be finite, got {}", axis, i, edge);
        }
    }
    for i in 1..edges.len() {
        if edges[i] <= edges[i - 1] {
            bail!(
                "{} axis edges must be strictly increasing (edges[{}]={} >= edges[{}]={})",
                axis,
                i - 1,
                edges[i - 1],
                i,
                edges[i]
            );
        }
    }
    Ok(())
}

/// Index of the bin containing `value`, if any.
pub fn find_bin(edges: &[f64], value: f64) -> Option<usize> {
    let last = *edges.last()?;
    let first = *edges.first()?;
    if !(value >= first && value <= last) {
        return None;
    }
    if value == last {
        return Some(edges.len() - 2);
    }
    // First edge strictly greater than value, minus one.
    let upper = edges.partition_point(|edge| *edge <= value);
    Some(upper - 1)
}

pub fn uniform_edges(lo: f64, hi: f64, bins: usize) -> Vec<f64> {
    let width = (hi - lo) / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { hi } else { lo + i as f64 * width })
        .collect()
}

/// Every `factor`-th edge, always ending on the last one.
fn rebin_edges(edges: &[f64], factor: usize) -> Vec<f64> {
    let mut merged: Vec<f64> = edges.iter().copied().step_by(factor).collect();
    if let (Some(&last_kept), Some(&last)) = (merged.last(), edges.last()) {
        if last_kept != last {
            merged.push(last);
        }
    }
    merged
}

#[derive(Debug, Clone)]
pub struct Hist1D {
    edges: Vec<f64>,
    counts: Vec<f64>,
}

impl Hist1D {
    pub fn new(edges: Vec<f64>) -> Result<Self> {
        validate_edges("x", &edges)?;
        let nbins = edges.len() - 1;
        Ok(Self {
            edges,
            counts: vec![0.0; nbins],
        })
    }

    pub fn fill(&mut self, value: f64, weight: f64) {
        if let Some(bin) = find_bin(&self.edges, value) {
            self.counts[bin] += weight;
        }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    pub fn integral(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// `(lo, hi, content)` for each bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, c)| (w[0], w[1], *c))
    }
}

/// Per-bin mean of one variable in bins of another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePoint {
    pub center: f64,
    pub half_width: f64,
    pub mean: f64,
    pub variance: f64,
    /// Standard error on the mean.
    pub error: f64,
}

#[derive(Debug, Clone)]
pub struct Hist2D {
    x_edges: Vec<f64>,
    y_edges: Vec<f64>,
    /// Row-major: `counts[ix][iy]`.
    counts: Vec<Vec<f64>>,
    sumw2: Vec<Vec<f64>>,
}

impl Hist2D {
    pub fn new(x_edges: Vec<f64>, y_edges: Vec<f64>) -> Result<Self> {
        validate_edges("x", &x_edges)?;
        validate_edges("y", &y_edges)?;
        let nx = x_edges.len() - 1;
        let ny = y_edges.len() - 1;
        Ok(Self {
            x_edges,
            y_edges,
            counts: vec![vec![0.0; ny]; nx],
            sumw2: vec![vec![0.0; ny]; nx],
        })
    }

    pub fn fill(&mut self, x: f64, y: f64, weight: f64) {
        let (Some(ix), Some(iy)) = (find_bin(&self.x_edges, x), find_bin(&self.y_edges, y)) else {
            return;
        };
        self.counts[ix][iy] += weight;
        self.sumw2[ix][iy] += weight * weight;
    }

    pub fn x_edges(&self) -> &[f64] {
        &self.x_edges
    }

    pub fn y_edges(&self) -> &[f64] {
        &self.y_edges
    }

    pub fn counts(&self) -> &[Vec<f64>] {
        &self.counts
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.x_edges.len() - 1, self.y_edges.len() - 1)
    }

    pub fn integral(&self) -> f64 {
        self.counts.iter().flatten().sum()
    }

    pub fn max_count(&self) -> f64 {
        self.counts
            .iter()
            .flatten()
            .copied()
            .fold(0.0f64, f64::max)
    }

    /// `(x_lo, x_hi, y_lo, y_hi, content)` for each bin.
    pub fn bins(&self) -> Vec<(f64, f64, f64, f64, f64)> {
        let mut out = Vec::new();
        for (ix, xw) in self.x_edges.windows(2).enumerate() {
            for (iy, yw) in self.y_edges.windows(2).enumerate() {
                out.push((xw[0], xw[1], yw[0], yw[1], self.counts[ix][iy]));
            }
        }
        out
    }

    /// Merge every `factor` adjacent bins along both axes. Factors 0 and 1
    /// return an unchanged copy.
    pub fn rebin(&self, factor: usize) -> Hist2D {
        if factor <= 1 {
            return self.clone();
        }

        let x_edges = rebin_edges(&self.x_edges, factor);
        let y_edges = rebin_edges(&self.y_edges, factor);
        let nx = x_edges.len() - 1;
        let ny = y_edges.len() - 1;

        let mut counts = vec![vec![0.0; ny]; nx];
        let mut sumw2 = vec![vec![0.0; ny]; nx];
        for (ix, row) in self.counts.iter().enumerate() {
            for (iy, count) in row.iter().enumerate() {
                counts[ix / factor][iy / factor] += count;
                sumw2[ix / factor][iy / factor] += self.sumw2[ix][iy];
            }
        }

        Hist2D {
            x_edges,
            y_edges,
            counts,
            sumw2,
        }
    }

    pub fn transpose(&self) -> Hist2D {
        let (nx, ny) = self.shape();
        let mut counts = vec![vec![0.0; nx]; ny];
        let mut sumw2 = vec![vec![0.0; nx]; ny];
        for ix in 0..nx {
            for iy in 0..ny {
                counts[iy][ix] = self.counts[ix][iy];
                sumw2[iy][ix] = self.sumw2[ix][iy];
            }
        }

        Hist2D {
            x_edges: self.y_edges.clone(),
            y_edges: self.x_edges.clone(),
            counts,
            sumw2,
        }
    }

    /// Profile of y along x, using y bin centres. Empty x bins are skipped.
    pub fn profile(&self) -> Vec<ProfilePoint> {
        let y_centers: Vec<f64> = self.y_edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();

        self.x_edges
            .windows(2)
            .zip(self.counts.iter().zip(&self.sumw2))
            .filter_map(|(xw, (row, row_w2))| {
                let sumw: f64 = row.iter().sum();
                if sumw <= 0.0 {
                    return None;
                }
                let sumw2: f64 = row_w2.iter().sum();

                let mean = row.iter().zip(&y_centers).map(|(c, y)| c * y).sum::<f64>() / sumw;
                let variance = (row
                    .iter()
                    .zip(&y_centers)
                    .map(|(c, y)| c * (y - mean) * (y - mean))
                    .sum::<f64>()
                    / sumw)
                    .max(0.0);
                let n_eff = if sumw2 > 0.0 { sumw * sumw / sumw2 } else { 0.0 };
                let error = if n_eff > 0.0 { (variance / n_eff).sqrt() } else { 0.0 };

                Some(ProfilePoint {
                    center: 0.5 * (xw[0] + xw[1]),
                    half_width: 0.5 * (xw[1] - xw[0]),
                    mean,
                    variance,
                    error,
                })
            })
            .collect()
    }
}
