//! Sampling a fitted color field onto a regular LUT grid.
//!
//! # Algorithm
//! 1. Identity grid: cell `(i, j, k)` holds `(i, j, k) / (N − 1)`
//! 2. Evaluate the field at every identity coordinate
//! 3. Blend: `blend × predicted + (1 − blend) × identity`
//! 4. Clamp each component to `[0, 1]`
//! 5. Boundary snap: per channel, where the identity coordinate is within
//!    `snap_tolerance` of 1.0, the output is reset to the identity value
//!
//! An empty correspondence set skips steps 2–5 and yields the identity grid.

use crate::correction::CorrespondencePair;
use crate::error::LutError;
use crate::transform::lut::Lut3D;
use crate::transform::params::SynthesisParams;
use crate::transform::rbf::ColorField;

/// Evaluates fitted fields on an `N×N×N` grid.
#[derive(Debug, Clone, Copy)]
pub struct GridSampler<'a> {
    pub params: &'a SynthesisParams,
}

impl<'a> GridSampler<'a> {
    pub fn new(params: &'a SynthesisParams) -> Self {
        Self { params }
    }

    /// Fit `pairs` and sample the resulting field. Empty `pairs` yield the identity grid.
    pub fn sample(&self, pairs: &[CorrespondencePair]) -> Result<Lut3D, LutError> {
        self.params.validate()?;
        if pairs.is_empty() {
            return Ok(self.identity());
        }
        let field = ColorField::fit(pairs, self.params)?;
        Ok(self.sample_field(&field))
    }

    /// Identity grid at the configured size and title.
    pub fn identity(&self) -> Lut3D {
        Lut3D::identity(self.params.lut_size).with_title(&self.params.title)
    }

    /// Sample an already-fitted field, applying blend, clamp and boundary snap.
    pub fn sample_field(&self, field: &ColorField) -> Lut3D {
        let mut lut = self.identity();
        let blend = self.params.blend;
        let tolerance = self.params.snap_tolerance;

        let predicted = field.evaluate_many(&lut.data);
        for (cell, predicted) in lut.data.iter_mut().zip(predicted) {
            for c in 0..3 {
                let id = cell[c];
                if (id - 1.0).abs() > tolerance {
                    cell[c] = (blend * predicted[c] + (1.0 - blend) * id).clamp(0.0, 1.0);
                }
            }
        }

        tracing::debug!(size = lut.size, centers = field.center_count(), "sampled color field");
        lut
    }
}
