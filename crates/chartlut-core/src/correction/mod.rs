//! Sparse color correspondences: normalization and augmentation before fitting.

pub mod augment;
pub mod normalize;

use serde::{Deserialize, Serialize};

use crate::error::LutError;
use crate::sample::ColorSample;

/// `before` was captured or rendered as `after`. The fitted field maps `before` → `after`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrespondencePair {
    pub before: ColorSample,
    pub after: ColorSample,
}

impl CorrespondencePair {
    pub const fn new(before: ColorSample, after: ColorSample) -> Self {
        Self { before, after }
    }
}

/// Ordered correspondences. Order does not affect the fit but pairing must be kept.
pub type CorrespondenceSet = Vec<CorrespondencePair>;

/// Zip two equal-length sample lists into a correspondence set.
pub fn zip_pairs(before: &[ColorSample], after: &[ColorSample]) -> Result<CorrespondenceSet, LutError> {
    if before.len() != after.len() {
        return Err(LutError::InvalidInput(format!(
            "before_data has {} entries but after_data has {}",
            before.len(),
            after.len()
        )));
    }
    Ok(before
        .iter()
        .zip(after)
        .map(|(&b, &a)| CorrespondencePair::new(b, a))
        .collect())
}
