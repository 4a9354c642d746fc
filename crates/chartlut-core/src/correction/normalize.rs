//! Exposure/contrast alignment of the captured samples against the reference.
//!
//! The global scalar range (min and max over every channel of every sample)
//! of `after` is affinely mapped onto the range of `before`:
//! ```text
//! after' = (after - after_min) / (after_max - after_min) × (before_max - before_min) + before_min
//! ```
//! A degenerate `after` range (all components identical) leaves `after` untouched.

use crate::error::LutError;
use crate::sample::ColorSample;

/// Global `(min, max)` across all channels of all samples. `None` for an empty slice.
pub fn scalar_range(samples: &[ColorSample]) -> Option<(f64, f64)> {
    samples.iter().fold(None, |acc, s| {
        let (lo, hi) = (s.min_component(), s.max_component());
        Some(match acc {
            None => (lo, hi),
            Some((min, max)) => (f64::min(min, lo), f64::max(max, hi)),
        })
    })
}

/// Rescale `after` so its scalar range matches `before`. `before` is returned unchanged.
pub fn normalize(before: &[ColorSample], after: &[ColorSample]) -> Result<Vec<ColorSample>, LutError> {
    if before.len() != after.len() {
        return Err(LutError::InvalidInput(format!(
            "before_data has {} entries but after_data has {}",
            before.len(),
            after.len()
        )));
    }
    let (Some((before_min, before_max)), Some((after_min, after_max))) =
        (scalar_range(before), scalar_range(after))
    else {
        return Err(LutError::InvalidInput(
            "correction lists must not be empty".to_string(),
        ));
    };

    let after_span = after_max - after_min;
    if after_span <= 0.0 {
        tracing::debug!("after samples have no spread; skipping normalization");
        return Ok(after.to_vec());
    }

    let before_span = before_max - before_min;
    Ok(after
        .iter()
        .map(|s| ColorSample(s.0.map(|v| (v - after_min) / after_span * before_span + before_min)))
        .collect())
}
