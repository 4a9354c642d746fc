//! Radial basis function fit of a smooth color field through correspondences.
//!
//! Three scalar interpolants are fitted, one per output channel, each over the
//! 3D `before` coordinates as centers. For `M` centers the weights solve
//! ```text
//! (Φ − smooth·I) w_c = after_c        Φ[i][j] = φ(‖x_i − x_j‖)
//! ```
//! and the field evaluates as `f_c(x) = Σ w_c[i] φ(‖x − x_i‖)`.
//!
//! The channels share `Φ`, so it is LU-factored once and solved for three
//! right-hand sides. There is no cross-channel coupling.
//!
//! # Complexity
//! - Fit: O(M³) factorization + O(M²) per channel
//! - Evaluate: O(M) per query point

use glam::DVec3;

use crate::correction::CorrespondencePair;
use crate::error::LutError;
use crate::transform::params::{RbfKernel, SynthesisParams};

/// Pivots smaller than this are treated as a singular system.
const PIVOT_EPSILON: f64 = 1e-12;

/// A fitted field ℝ³ → ℝ³, materialized only by evaluation.
#[derive(Debug, Clone)]
pub struct ColorField {
    centers: Vec<DVec3>,
    /// Per-center weights for the R, G and B interpolants.
    weights: Vec<[f64; 3]>,
    kernel: RbfKernel,
    epsilon: f64,
}

impl ColorField {
    /// Fit the field through `pairs` so that `before` maps toward `after`.
    pub fn fit(pairs: &[CorrespondencePair], params: &SynthesisParams) -> Result<Self, LutError> {
        let centers: Vec<DVec3> = pairs
            .iter()
            .map(|p| DVec3::from_array(p.before.components()))
            .collect();

        let distinct = count_distinct(&centers);
        if distinct < 2 {
            return Err(LutError::DegenerateFit(format!(
                "need at least 2 distinct correspondence points, got {distinct}"
            )));
        }

        let n = centers.len();
        let mut matrix = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                matrix[i * n + j] = params.kernel.eval(centers[i].distance(centers[j]), params.epsilon);
            }
            matrix[i * n + i] -= params.smooth;
        }

        let lu = LuFactors::factor(matrix, n)?;
        let per_channel: [Vec<f64>; 3] = std::array::from_fn(|c| {
            let rhs: Vec<f64> = pairs.iter().map(|p| p.after.0[c]).collect();
            lu.solve(rhs)
        });

        let weights = (0..n)
            .map(|i| [per_channel[0][i], per_channel[1][i], per_channel[2][i]])
            .collect();

        tracing::debug!(centers = n, kernel = params.kernel.label(), "fitted color field");

        Ok(Self {
            centers,
            weights,
            kernel: params.kernel,
            epsilon: params.epsilon,
        })
    }

    /// Number of centers the field was fitted through.
    pub fn center_count(&self) -> usize {
        self.centers.len()
    }

    /// Predicted RGB at a single query point.
    pub fn evaluate(&self, point: [f64; 3]) -> [f64; 3] {
        let x = DVec3::from_array(point);
        let mut out = [0.0; 3];
        for (center, w) in self.centers.iter().zip(&self.weights) {
            let phi = self.kernel.eval(x.distance(*center), self.epsilon);
            out[0] += w[0] * phi;
            out[1] += w[1] * phi;
            out[2] += w[2] * phi;
        }
        out
    }

    /// Predicted RGB for every query point, in order.
    pub fn evaluate_many(&self, points: &[[f64; 3]]) -> Vec<[f64; 3]> {
        points.iter().map(|&p| self.evaluate(p)).collect()
    }
}

fn count_distinct(points: &[DVec3]) -> usize {
    let mut seen: Vec<DVec3> = Vec::new();
    for p in points {
        if !seen.contains(p) {
            seen.push(*p);
            if seen.len() >= 2 {
                break;
            }
        }
    }
    seen.len()
}

/// Dense LU factorization with partial pivoting, row-major.
struct LuFactors {
    lu: Vec<f64>,
    perm: Vec<usize>,
    n: usize,
}

impl LuFactors {
    fn factor(mut a: Vec<f64>, n: usize) -> Result<Self, LutError> {
        let mut perm: Vec<usize> = (0..n).collect();

        for k in 0..n {
            let (pivot_row, pivot_abs) = (k..n)
                .map(|r| (r, a[r * n + k].abs()))
                .fold((k, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });

            if !(pivot_abs > PIVOT_EPSILON) {
                return Err(LutError::DegenerateFit(format!(
                    "interpolation matrix is singular at column {k}"
                )));
            }

            if pivot_row != k {
                for col in 0..n {
                    a.swap(k * n + col, pivot_row * n + col);
                }
                perm.swap(k, pivot_row);
            }

            let pivot = a[k * n + k];
            for r in (k + 1)..n {
                let factor = a[r * n + k] / pivot;
                a[r * n + k] = factor;
                if factor != 0.0 {
                    for col in (k + 1)..n {
                        a[r * n + col] -= factor * a[k * n + col];
                    }
                }
            }
        }

        Ok(Self { lu: a, perm, n })
    }

    fn solve(&self, b: Vec<f64>) -> Vec<f64> {
        let n = self.n;
        let mut x: Vec<f64> = self.perm.iter().map(|&p| b[p]).collect();

        // Forward substitution with the unit-diagonal L.
        for r in 0..n {
            let mut sum = x[r];
            for c in 0..r {
                sum -= self.lu[r * n + c] * x[c];
            }
            x[r] = sum;
        }
        // Back substitution with U.
        for r in (0..n).rev() {
            let mut sum = x[r];
            for c in (r + 1)..n {
                sum -= self.lu[r * n + c] * x[c];
            }
            x[r] = sum / self.lu[r * n + r];
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::ColorSample;

    fn pair(b: [f64; 3], a: [f64; 3]) -> CorrespondencePair {
        CorrespondencePair::new(ColorSample(b), ColorSample(a))
    }

    fn exact_params(kernel: RbfKernel) -> SynthesisParams {
        SynthesisParams {
            kernel,
            epsilon: 0.5,
            smooth: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_lu_solves_small_system() {
        // [[2, 1], [4, 3]] x = [3, 7] → x = [1, 1]
        let lu = LuFactors::factor(vec![2.0, 1.0, 4.0, 3.0], 2).unwrap();
        let x = lu.solve(vec![3.0, 7.0]);
        assert!((x[0] - 1.0).abs() < 1e-12 && (x[1] - 1.0).abs() < 1e-12, "{x:?}");
    }

    #[test]
    fn test_lu_detects_singular_matrix() {
        let err = LuFactors::factor(vec![1.0, 2.0, 2.0, 4.0], 2).err().unwrap();
        assert_eq!(err.kind(), "degenerate_fit");
    }

    #[test]
    fn test_fit_without_smoothing_interpolates_centers() {
        let pairs = [
            pair([0.1, 0.2, 0.3], [0.15, 0.2, 0.25]),
            pair([0.8, 0.1, 0.4], [0.7, 0.2, 0.4]),
            pair([0.5, 0.9, 0.2], [0.5, 0.8, 0.3]),
            pair([0.3, 0.6, 0.9], [0.35, 0.55, 0.85]),
        ];
        for kernel in [RbfKernel::Multiquadric, RbfKernel::Gaussian, RbfKernel::Linear] {
            let field = ColorField::fit(&pairs, &exact_params(kernel)).unwrap();
            for p in &pairs {
                let got = field.evaluate(p.before.components());
                for c in 0..3 {
                    assert!(
                        (got[c] - p.after.0[c]).abs() < 1e-8,
                        "{}: channel {c} got {} expected {}",
                        kernel.label(),
                        got[c],
                        p.after.0[c]
                    );
                }
            }
        }
    }

    #[test]
    fn test_channels_are_independent() {
        let base = [
            pair([0.1, 0.1, 0.1], [0.2, 0.3, 0.4]),
            pair([0.9, 0.2, 0.5], [0.8, 0.1, 0.6]),
            pair([0.4, 0.7, 0.3], [0.5, 0.6, 0.2]),
        ];
        let mut changed = base;
        for p in &mut changed {
            p.after.0[2] = 1.0 - p.after.0[2];
        }
        let params = exact_params(RbfKernel::Multiquadric);
        let a = ColorField::fit(&base, &params).unwrap();
        let b = ColorField::fit(&changed, &params).unwrap();
        let q = [0.33, 0.44, 0.55];
        let (fa, fb) = (a.evaluate(q), b.evaluate(q));
        assert!((fa[0] - fb[0]).abs() < 1e-12);
        assert!((fa[1] - fb[1]).abs() < 1e-12);
        assert!((fa[2] - fb[2]).abs() > 1e-6);
    }

    #[test]
    fn test_fit_rejects_fewer_than_two_distinct_centers() {
        let params = SynthesisParams::default();
        assert!(ColorField::fit(&[], &params).is_err());
        let same = [pair([0.5; 3], [0.4; 3]), pair([0.5; 3], [0.6; 3])];
        let err = ColorField::fit(&same, &params).unwrap_err();
        assert_eq!(err.kind(), "degenerate_fit");
    }

    #[test]
    fn test_smoothing_handles_duplicate_centers() {
        // Repeated centers make Φ singular; the smoothing term keeps it solvable.
        let pairs = [
            pair([0.0; 3], [0.0; 3]),
            pair([0.0; 3], [0.0; 3]),
            pair([1.0; 3], [1.0; 3]),
        ];
        let field = ColorField::fit(&pairs, &SynthesisParams::default()).unwrap();
        assert_eq!(field.center_count(), 3);
        assert!(field.evaluate([0.5; 3]).iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_evaluate_many_preserves_order() {
        let pairs = [pair([0.0; 3], [0.1; 3]), pair([1.0; 3], [0.9; 3])];
        let field = ColorField::fit(&pairs, &exact_params(RbfKernel::Linear)).unwrap();
        let pts = [[0.0; 3], [1.0; 3]];
        let out = field.evaluate_many(&pts);
        assert_eq!(out[0], field.evaluate(pts[0]));
        assert_eq!(out[1], field.evaluate(pts[1]));
    }
}
