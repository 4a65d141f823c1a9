//! Gaussian kernel density estimates used to draw the density panels.
//!
//! Bandwidths follow Scott's rule (`n^(-1/(d+4))` times the sample
//! standard deviation / covariance), scaled by a user adjustment factor.

use std::collections::HashMap;
use std::f64::consts::PI;

/// How far past the data range a 1-D curve extends, in bandwidths.
const CUT: f64 = 3.0;

fn sample_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

// ---------------------------------------------------------------------------
// 1-D
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Kde1d {
    samples: Vec<f64>,
    bandwidth: f64,
}

impl Kde1d {
    /// `None` when the samples cannot support a density (fewer than two
    /// values or zero spread).
    pub fn fit(samples: Vec<f64>, adjust: f64) -> Option<Self> {
        let n = samples.len();
        if n < 2 || adjust <= 0.0 {
            return None;
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let std = sample_variance(&samples, mean).sqrt();
        if !(std > 0.0) {
            return None;
        }
        let bandwidth = std * (n as f64).powf(-0.2) * adjust;
        Some(Kde1d { samples, bandwidth })
    }

    pub fn density(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = 1.0 / (self.samples.len() as f64 * h * (2.0 * PI).sqrt());
        self.samples
            .iter()
            .map(|s| (-0.5 * ((x - s) / h).powi(2)).exp())
            .sum::<f64>()
            * norm
    }

    /// Density sampled on `grid_size` points spanning the data range
    /// widened by three bandwidths each side, multiplied by `weight`.
    pub fn curve(&self, grid_size: usize, weight: f64) -> Vec<[f64; 2]> {
        let lo = self.samples.iter().copied().fold(f64::INFINITY, f64::min) - CUT * self.bandwidth;
        let hi = self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max) + CUT * self.bandwidth;
        crate::interp::linspace(lo, hi, grid_size)
            .into_iter()
            .map(|x| [x, self.density(x) * weight])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// 2-D
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Kde2d {
    points: Vec<[f64; 2]>,
    /// Inverse of the kernel covariance, row-major `[a, b, b, d]`.
    inv_cov: [f64; 4],
    norm: f64,
}

impl Kde2d {
    pub fn fit(points: Vec<[f64; 2]>, adjust: f64) -> Option<Self> {
        let n = points.len();
        if n < 2 || adjust <= 0.0 {
            return None;
        }
        let nf = n as f64;
        let mx = points.iter().map(|p| p[0]).sum::<f64>() / nf;
        let my = points.iter().map(|p| p[1]).sum::<f64>() / nf;
        let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
        for p in &points {
            let (dx, dy) = (p[0] - mx, p[1] - my);
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }
        let factor = nf.powf(-1.0 / 6.0) * adjust;
        let scale = factor * factor / (nf - 1.0);
        let (a, b, d) = (sxx * scale, sxy * scale, syy * scale);

        let det = a * d - b * b;
        if !(det > 0.0) {
            return None;
        }
        Some(Kde2d {
            points,
            inv_cov: [d / det, -b / det, -b / det, a / det],
            norm: 1.0 / (nf * 2.0 * PI * det.sqrt()),
        })
    }

    pub fn density(&self, x: f64, y: f64) -> f64 {
        let [ia, ib, _, id] = self.inv_cov;
        self.points
            .iter()
            .map(|p| {
                let (dx, dy) = (x - p[0], y - p[1]);
                (-0.5 * (ia * dx * dx + 2.0 * ib * dx * dy + id * dy * dy)).exp()
            })
            .sum::<f64>()
            * self.norm
    }

    /// Evaluate on an `nx` × `ny` grid covering the given ranges.
    pub fn grid(&self, x_range: (f64, f64), y_range: (f64, f64), nx: usize, ny: usize) -> DensityGrid {
        let xs = crate::interp::linspace(x_range.0, x_range.1, nx);
        let ys = crate::interp::linspace(y_range.0, y_range.1, ny);
        let values = ys
            .iter()
            .flat_map(|&y| xs.iter().map(move |&x| (x, y)))
            .map(|(x, y)| self.density(x, y))
            .collect();
        DensityGrid { xs, ys, values }
    }
}

/// Fitted 2-D grids keyed by chart. A grid depends only on the points it
/// was fitted to, so entries stay valid until the dataset changes.
#[derive(Debug, Default)]
pub struct GridCache {
    grids: HashMap<String, Option<DensityGrid>>,
}

impl GridCache {
    /// The grid stored under `key`, fitting it on first use. A fit that
    /// yields nothing is remembered too.
    pub fn get_or_fit(&mut self, key: &str, fit: impl FnOnce() -> Option<DensityGrid>) -> Option<&DensityGrid> {
        if !self.grids.contains_key(key) {
            log::debug!("fitting density grid {key}");
            self.grids.insert(key.to_string(), fit());
        }
        self.grids.get(key).and_then(Option::as_ref)
    }

    pub fn clear(&mut self) {
        self.grids.clear();
    }
}

/// Density sampled on a regular grid, row-major by `y`.
#[derive(Debug, Clone)]
pub struct DensityGrid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub values: Vec<f64>,
}

impl DensityGrid {
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Band index (`0` = below threshold, else `1..=levels`) for each of
    /// the `(nx - 1) * (ny - 1)` cells, row-major.
    fn cell_levels(&self, levels: usize, thresh: f64) -> Vec<usize> {
        let peak = self.max();
        let nx = self.xs.len();
        if peak <= 0.0 || nx < 2 || self.ys.len() < 2 || levels == 0 {
            return Vec::new();
        }
        let mut out = Vec::with_capacity((nx - 1) * (self.ys.len() - 1));
        for j in 0..self.ys.len() - 1 {
            for i in 0..nx - 1 {
                let v = (self.values[j * nx + i]
                    + self.values[j * nx + i + 1]
                    + self.values[(j + 1) * nx + i]
                    + self.values[(j + 1) * nx + i + 1])
                    / 4.0
                    / peak;
                let level = if v < thresh {
                    0
                } else {
                    ((v * levels as f64).ceil() as usize).clamp(1, levels)
                };
                out.push(level);
            }
        }
        out
    }

    /// Cells quantised into `levels` bands of relative density; cells below
    /// `thresh` (as a fraction of the peak) are dropped. Levels run
    /// `1..=levels`.
    pub fn banded_cells(&self, levels: usize, thresh: f64) -> Vec<Cell> {
        let cx = self.xs.len().saturating_sub(1);
        self.cell_levels(levels, thresh)
            .iter()
            .enumerate()
            .filter(|(_, &level)| level > 0)
            .map(|(k, &level)| self.cell(k % cx, k / cx, level))
            .collect()
    }

    /// Only the cells where the band changes, i.e. an outline of each level.
    pub fn contour_cells(&self, levels: usize, thresh: f64) -> Vec<Cell> {
        let grid = self.cell_levels(levels, thresh);
        if grid.is_empty() {
            return Vec::new();
        }
        let cx = self.xs.len() - 1;
        let cy = self.ys.len() - 1;
        let at = |i: isize, j: isize| -> usize {
            if i < 0 || j < 0 || i >= cx as isize || j >= cy as isize {
                0
            } else {
                grid[j as usize * cx + i as usize]
            }
        };
        let mut cells = Vec::new();
        for j in 0..cy {
            for i in 0..cx {
                let level = grid[j * cx + i];
                if level == 0 {
                    continue;
                }
                let (ii, jj) = (i as isize, j as isize);
                let edge = [(ii - 1, jj), (ii + 1, jj), (ii, jj - 1), (ii, jj + 1)]
                    .iter()
                    .any(|&(a, b)| at(a, b) < level);
                if edge {
                    cells.push(self.cell(i, j, level));
                }
            }
        }
        cells
    }

    fn cell(&self, i: usize, j: usize, level: usize) -> Cell {
        Cell {
            x0: self.xs[i],
            y0: self.ys[j],
            x1: self.xs[i + 1],
            y1: self.ys[j + 1],
            level,
        }
    }
}

/// One grid cell of a banded density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub level: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_samples_have_no_density() {
        assert!(Kde1d::fit(vec![], 1.0).is_none());
        assert!(Kde1d::fit(vec![50.0], 1.0).is_none());
        assert!(Kde1d::fit(vec![50.0, 50.0, 50.0], 1.0).is_none());
        assert!(Kde2d::fit(vec![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]], 1.0).is_none());
    }

    #[test]
    fn one_dimensional_density_integrates_to_one() {
        let kde = Kde1d::fit(vec![40.0, 45.0, 50.0, 52.0, 61.0, 70.0], 1.0).unwrap();
        let curve = kde.curve(400, 1.0);
        let dx = curve[1][0] - curve[0][0];
        let area: f64 = curve.iter().map(|p| p[1]).sum::<f64>() * dx;
        assert!((area - 1.0).abs() < 0.01, "area = {area}");
    }

    #[test]
    fn adjust_scales_bandwidth() {
        let data = vec![40.0, 45.0, 50.0, 52.0, 61.0, 70.0];
        let base = Kde1d::fit(data.clone(), 1.0).unwrap().bandwidth;
        let wide = Kde1d::fit(data, 2.0).unwrap().bandwidth;
        assert!((wide - 2.0 * base).abs() < 1e-12);
    }

    #[test]
    fn two_dimensional_peak_near_mean() {
        let pts = vec![[50.0, 130.0], [52.0, 135.0], [48.0, 128.0], [51.0, 140.0], [49.0, 125.0]];
        let kde = Kde2d::fit(pts, 0.5).unwrap();
        assert!(kde.density(50.0, 131.6) > kde.density(70.0, 180.0));
        let grid = kde.grid((40.0, 60.0), (110.0, 150.0), 20, 20);
        assert_eq!(grid.values.len(), 400);
        let cells = grid.banded_cells(10, 0.05);
        assert!(!cells.is_empty());
        assert!(cells.iter().all(|c| (1..=10).contains(&c.level)));

        let outline = grid.contour_cells(10, 0.05);
        assert!(!outline.is_empty());
        assert!(outline.len() < cells.len());
        assert!(outline.iter().all(|c| cells.contains(c)));
    }

    #[test]
    fn grid_cache_fits_once_per_key() {
        let pts = vec![[50.0, 130.0], [52.0, 135.0], [48.0, 128.0], [51.0, 140.0]];
        let fit = || Kde2d::fit(pts.clone(), 0.5).map(|k| k.grid((40.0, 60.0), (110.0, 150.0), 8, 8));
        let mut cache = GridCache::default();
        let mut fits = 0;

        for _ in 0..3 {
            let grid = cache.get_or_fit("healthy", || {
                fits += 1;
                fit()
            });
            assert_eq!(grid.map(|g| g.values.len()), Some(64));
        }
        assert_eq!(fits, 1);

        // unfittable data is remembered as absent
        for _ in 0..2 {
            assert!(cache.get_or_fit("empty", || {
                fits += 1;
                None
            })
            .is_none());
        }
        assert_eq!(fits, 2);

        cache.clear();
        cache.get_or_fit("healthy", || {
            fits += 1;
            fit()
        });
        assert_eq!(fits, 3);
    }
}
