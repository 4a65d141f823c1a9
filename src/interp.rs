use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::stats::GroupedMean;

/// Number of evenly spaced points a smoothed curve is drawn with.
pub const DISPLAY_POINTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationKind {
    Linear,
    Nearest,
    /// Step function holding the previous value.
    Zero,
    /// First-order spline; same curve as `Linear`.
    SLinear,
    Quadratic,
    #[default]
    Cubic,
}

impl InterpolationKind {
    pub const ALL: [InterpolationKind; 6] = [
        InterpolationKind::Linear,
        InterpolationKind::Nearest,
        InterpolationKind::Zero,
        InterpolationKind::SLinear,
        InterpolationKind::Quadratic,
        InterpolationKind::Cubic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InterpolationKind::Linear => "linear",
            InterpolationKind::Nearest => "nearest",
            InterpolationKind::Zero => "zero",
            InterpolationKind::SLinear => "slinear",
            InterpolationKind::Quadratic => "quadratic",
            InterpolationKind::Cubic => "cubic",
        }
    }

    /// Fewest knots the method can be built from.
    pub fn min_points(self) -> usize {
        match self {
            InterpolationKind::Quadratic => 3,
            InterpolationKind::Cubic => 4,
            _ => 2,
        }
    }
}

impl fmt::Display for InterpolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    #[error("{kind} interpolation needs at least {needed} points, got {got}")]
    TooFewPoints {
        kind: InterpolationKind,
        needed: usize,
        got: usize,
    },
    #[error("x and y lengths differ ({0} vs {1})")]
    LengthMismatch(usize, usize),
    #[error("x values must be strictly increasing (index {0})")]
    NotIncreasing(usize),
    #[error("non-finite value at index {0}")]
    NonFinite(usize),
    #[error("spline collocation system is singular")]
    Singular,
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Interpolator
// ---------------------------------------------------------------------------

/// A one-dimensional interpolant through `(xs[i], ys[i])`.
#[derive(Debug, Clone)]
pub struct Interpolator {
    kind: InterpolationKind,
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Set for the quadratic and cubic kinds.
    spline: Option<BSpline>,
}

impl Interpolator {
    pub fn new(kind: InterpolationKind, xs: &[f64], ys: &[f64]) -> Result<Self, InterpolationError> {
        if xs.len() != ys.len() {
            return Err(InterpolationError::LengthMismatch(xs.len(), ys.len()));
        }
        if xs.len() < kind.min_points() {
            return Err(InterpolationError::TooFewPoints {
                kind,
                needed: kind.min_points(),
                got: xs.len(),
            });
        }
        if let Some(i) = xs
            .iter()
            .zip(ys)
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(InterpolationError::NonFinite(i));
        }
        if let Some(i) = xs.windows(2).position(|w| w[1] <= w[0]) {
            return Err(InterpolationError::NotIncreasing(i + 1));
        }

        let spline = match kind {
            InterpolationKind::Quadratic => Some(BSpline::interpolate(xs, ys, 2)?),
            InterpolationKind::Cubic => Some(BSpline::interpolate(xs, ys, 3)?),
            _ => None,
        };

        Ok(Interpolator {
            kind,
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            spline,
        })
    }

    /// Evaluate at `x`, clamped to the knot range.
    pub fn eval(&self, x: f64) -> f64 {
        let (xs, ys) = (&self.xs, &self.ys);
        let x = x.clamp(xs[0], xs[xs.len() - 1]);
        if let Some(spline) = &self.spline {
            return spline.eval(x);
        }
        // interval [xs[i], xs[i + 1]] containing x
        let i = xs.partition_point(|&k| k <= x).saturating_sub(1).min(xs.len() - 2);
        let h = xs[i + 1] - xs[i];
        let t = x - xs[i];

        match self.kind {
            // ties go to the lower knot
            InterpolationKind::Nearest => {
                if t <= h / 2.0 {
                    ys[i]
                } else {
                    ys[i + 1]
                }
            }
            InterpolationKind::Zero => {
                if x >= xs[i + 1] {
                    ys[i + 1]
                } else {
                    ys[i]
                }
            }
            _ => ys[i] + (ys[i + 1] - ys[i]) * t / h,
        }
    }

    /// Sample `n` evenly spaced points between the first and last knot.
    pub fn resample(&self, n: usize) -> Vec<[f64; 2]> {
        linspace(self.xs[0], self.xs[self.xs.len() - 1], n)
            .into_iter()
            .map(|x| [x, self.eval(x)])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// B-spline interpolant
// ---------------------------------------------------------------------------

/// Interpolating B-spline of degree `k` with clamped end knots.
///
/// Interior knots: for `k = 2` the midpoints between data sites, minus the
/// first and last midpoint; for `k = 3` the data sites minus the second and
/// second-to-last (not-a-knot). Either way there are as many basis functions
/// as data points, and a disturbance decays within a few knots.
#[derive(Debug, Clone)]
struct BSpline {
    knots: Vec<f64>,
    coeffs: Vec<f64>,
    degree: usize,
}

impl BSpline {
    fn interpolate(xs: &[f64], ys: &[f64], degree: usize) -> Result<Self, InterpolationError> {
        let n = xs.len();
        let (first, last) = (xs[0], xs[n - 1]);

        let mut knots = vec![first; degree + 1];
        if degree == 2 {
            knots.extend((2..n - 1).map(|i| (xs[i - 1] + xs[i]) / 2.0));
        } else {
            let m = (degree - 1) / 2;
            knots.extend_from_slice(&xs[m + 1..n - m - 1]);
        }
        knots.extend(std::iter::repeat(last).take(degree + 1));

        let mut spline = BSpline {
            knots,
            coeffs: vec![0.0; n],
            degree,
        };

        // collocation matrix, row i = basis functions at xs[i]
        let mut a = vec![vec![0.0; n]; n];
        for (row, &x) in a.iter_mut().zip(xs) {
            let span = spline.span(x);
            for (r, b) in spline.basis(span, x).into_iter().enumerate() {
                row[span - degree + r] = b;
            }
        }
        spline.coeffs = solve(a, ys.to_vec())?;
        Ok(spline)
    }

    /// Index `l` with `knots[l] <= x < knots[l + 1]`, restricted to the
    /// spans that carry the curve.
    fn span(&self, x: f64) -> usize {
        let n = self.coeffs.len();
        self.knots
            .partition_point(|&t| t <= x)
            .saturating_sub(1)
            .clamp(self.degree, n - 1)
    }

    /// The `degree + 1` basis functions that are non-zero on `span`.
    fn basis(&self, span: usize, x: f64) -> Vec<f64> {
        let (t, k) = (&self.knots, self.degree);
        let mut values = vec![0.0; k + 1];
        let mut left = vec![0.0; k + 1];
        let mut right = vec![0.0; k + 1];
        values[0] = 1.0;
        for j in 1..=k {
            left[j] = x - t[span + 1 - j];
            right[j] = t[span + j] - x;
            let mut saved = 0.0;
            for r in 0..j {
                let tmp = values[r] / (right[r + 1] + left[j - r]);
                values[r] = saved + right[r + 1] * tmp;
                saved = left[j - r] * tmp;
            }
            values[j] = saved;
        }
        values
    }

    fn eval(&self, x: f64) -> f64 {
        let span = self.span(x);
        self.basis(span, x)
            .iter()
            .enumerate()
            .map(|(r, b)| b * self.coeffs[span - self.degree + r])
            .sum()
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, InterpolationError> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(InterpolationError::Singular);
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..n {
            let f = a[row][col] / a[col][col];
            if f == 0.0 {
                continue;
            }
            for c in col..n {
                a[row][c] -= f * a[col][c];
            }
            b[row] -= f * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|c| a[row][c] * x[c]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

// ---------------------------------------------------------------------------
// Display smoothing
// ---------------------------------------------------------------------------

/// Curve to draw for a grouped series.
///
/// Series with fewer than two keys are returned verbatim. Otherwise the
/// series is resampled at [`DISPLAY_POINTS`] points; if the method cannot be
/// built from this series the raw means are returned instead.
pub fn smooth(series: &GroupedMean, kind: InterpolationKind) -> Vec<[f64; 2]> {
    if series.len() < 2 {
        return series.points.clone();
    }
    match Interpolator::new(kind, &series.keys(), &series.values()) {
        Ok(interp) => interp.resample(DISPLAY_POINTS),
        Err(e) => {
            log::debug!("{kind} smoothing skipped: {e}");
            series.points.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn linspace_endpoints() {
        let v = linspace(30.0, 70.0, 100);
        assert_eq!(v.len(), 100);
        assert_eq!(v[0], 30.0);
        assert_eq!(v[99], 70.0);
        assert!(v.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn every_kind_passes_through_knots() {
        let xs = [40.0, 45.0, 52.0, 60.0, 66.0];
        let ys = [170.0, 150.0, 155.0, 130.0, 125.0];
        for kind in InterpolationKind::ALL {
            let it = Interpolator::new(kind, &xs, &ys).unwrap();
            for (x, y) in xs.iter().zip(&ys) {
                assert!(approx(it.eval(*x), *y), "{kind} at {x}");
            }
        }
    }

    #[test]
    fn linear_midpoint() {
        let it = Interpolator::new(InterpolationKind::Linear, &[0.0, 10.0], &[100.0, 200.0]).unwrap();
        assert!(approx(it.eval(2.5), 125.0));
    }

    #[test]
    fn nearest_and_zero_steps() {
        let xs = [0.0, 10.0];
        let ys = [1.0, 2.0];
        let nearest = Interpolator::new(InterpolationKind::Nearest, &xs, &ys).unwrap();
        assert_eq!(nearest.eval(4.0), 1.0);
        assert_eq!(nearest.eval(5.0), 1.0);
        assert_eq!(nearest.eval(6.0), 2.0);
        let zero = Interpolator::new(InterpolationKind::Zero, &xs, &ys).unwrap();
        assert_eq!(zero.eval(9.9), 1.0);
        assert_eq!(zero.eval(10.0), 2.0);
    }

    #[test]
    fn quadratic_reproduces_parabola() {
        let xs = [0.0, 1.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| x * x - 2.0 * x + 5.0).collect();
        let it = Interpolator::new(InterpolationKind::Quadratic, &xs, &ys).unwrap();
        for x in [0.5, 2.0, 3.7] {
            assert!(approx(it.eval(x), x * x - 2.0 * x + 5.0), "at {x}");
        }
    }

    #[test]
    fn cubic_reproduces_cubic_polynomial() {
        // not-a-knot ends reproduce any cubic, unlike a natural spline
        let f = |x: f64| 0.5 * x.powi(3) - 2.0 * x * x + x + 3.0;
        let xs = [0.0, 1.0, 2.5, 4.0, 5.0, 7.0];
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let it = Interpolator::new(InterpolationKind::Cubic, &xs, &ys).unwrap();
        for x in [0.2, 0.9, 3.3, 6.1, 6.9] {
            assert!((it.eval(x) - f(x)).abs() < 1e-7, "at {x}");
        }
    }

    #[test]
    fn early_spike_does_not_disturb_flat_tail() {
        let xs: Vec<f64> = (30..=77).map(f64::from).collect();
        let mut ys = vec![140.0; xs.len()];
        ys[1] = 180.0;
        ys[2] = 120.0;
        for kind in [InterpolationKind::Quadratic, InterpolationKind::Cubic] {
            let it = Interpolator::new(kind, &xs, &ys).unwrap();
            for [x, y] in it.resample(DISPLAY_POINTS) {
                if x > 60.0 {
                    assert!((y - 140.0).abs() < 1e-6, "{kind} at {x}: {y}");
                }
            }
        }
    }

    #[test]
    fn cubic_reproduces_line() {
        let xs = [1.0, 2.0, 4.0, 7.0, 8.0];
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * x - 1.0).collect();
        let it = Interpolator::new(InterpolationKind::Cubic, &xs, &ys).unwrap();
        for x in [1.5, 3.0, 5.5, 7.9] {
            assert!(approx(it.eval(x), 3.0 * x - 1.0), "at {x}");
        }
    }

    #[test]
    fn rejects_degenerate_input() {
        assert_eq!(
            Interpolator::new(InterpolationKind::Cubic, &[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap_err(),
            InterpolationError::TooFewPoints {
                kind: InterpolationKind::Cubic,
                needed: 4,
                got: 3
            }
        );
        assert_eq!(
            Interpolator::new(InterpolationKind::Linear, &[1.0, 1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err(),
            InterpolationError::NotIncreasing(1)
        );
        assert_eq!(
            Interpolator::new(InterpolationKind::Linear, &[1.0, f64::NAN], &[1.0, 2.0]).unwrap_err(),
            InterpolationError::NonFinite(1)
        );
    }

    #[test]
    fn smooth_resamples_to_display_points() {
        let series = GroupedMean {
            points: vec![[40.0, 150.0], [50.0, 140.0], [55.0, 145.0], [60.0, 120.0]],
        };
        let curve = smooth(&series, InterpolationKind::Cubic);
        assert_eq!(curve.len(), DISPLAY_POINTS);
        assert_eq!(curve[0][0], 40.0);
        assert_eq!(curve[DISPLAY_POINTS - 1][0], 60.0);
        // underlying series untouched
        assert_eq!(series.len(), 4);
    }

    #[test]
    fn smooth_falls_back_to_raw() {
        let single = GroupedMean {
            points: vec![[50.0, 140.0]],
        };
        assert_eq!(smooth(&single, InterpolationKind::Linear), single.points);

        let short = GroupedMean {
            points: vec![[40.0, 150.0], [50.0, 140.0]],
        };
        assert_eq!(smooth(&short, InterpolationKind::Cubic), short.points);
        assert_eq!(smooth(&short, InterpolationKind::Linear).len(), DISPLAY_POINTS);
    }
}
