//! Expansion of a small correspondence set into a better-conditioned one.
//!
//! # Algorithm
//! 1. Every pair `(b, a)` is scaled by each multiplier `m` of an evenly spaced
//!    sequence; `(b·m, a·m)` is kept only if all six components lie in `[0, 1]`.
//! 2. The eight cube corners `c ∈ {0,1}³` are anchored as `(c, c·corner_scale)`.
//!    Anchors are not range-checked: the `(1,1,1)` anchor deliberately lands
//!    outside the cube so the fit is pushed outward near white and the
//!    primaries; the grid sampler's clamp and boundary snap restore validity.
//!
//! The unscaled input pairs are not carried over themselves; only their scaled
//! variants and the anchors reach the fitter.

use crate::correction::{CorrespondencePair, CorrespondenceSet};
use crate::sample::ColorSample;
use crate::transform::params::SynthesisParams;

/// `steps` evenly spaced values over `[start, stop]`, both ends inclusive.
///
/// The last value is exactly `stop`. A single step yields `[start]`.
pub fn multipliers((start, stop): (f64, f64), steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (steps - 1) as f64;
            let mut values: Vec<f64> = (0..steps).map(|i| start + i as f64 * step).collect();
            values[steps - 1] = stop;
            values
        }
    }
}

/// The eight binary cube corners, red outermost and blue innermost.
pub fn cube_corners() -> [ColorSample; 8] {
    std::array::from_fn(|i| {
        let bit = |shift: usize| ((i >> shift) & 1) as f64;
        ColorSample::new(bit(2), bit(1), bit(0))
    })
}

/// Build the augmented set: retained scaled pairs followed by the eight corner anchors.
pub fn augment(pairs: &[CorrespondencePair], params: &SynthesisParams) -> CorrespondenceSet {
    let steps = multipliers(params.multiplier_range, params.multiplier_steps);
    let mut out = Vec::with_capacity(pairs.len() * steps.len() + 8);

    for pair in pairs {
        for &m in &steps {
            let before = pair.before.scale(m);
            let after = pair.after.scale(m);
            if before.in_unit_cube() && after.in_unit_cube() {
                out.push(CorrespondencePair::new(before, after));
            }
        }
    }

    let scaled = out.len();
    out.extend(
        cube_corners()
            .into_iter()
            .map(|c| CorrespondencePair::new(c, c.scale(params.corner_scale))),
    );

    tracing::debug!(
        input = pairs.len(),
        scaled,
        total = out.len(),
        "augmented correspondence set"
    );
    out
}
