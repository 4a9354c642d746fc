//! End-to-end operations: hex correspondences → LUT, and LUT → corrected image.
//!
//! Inputs are validated in full before any numerical work starts. Each call
//! builds its own correspondence sets and grids, so calls are independent and
//! safe to run concurrently.

use crate::correction::augment::augment;
use crate::correction::normalize::normalize;
use crate::correction::zip_pairs;
use crate::error::LutError;
use crate::image::GradingImage;
use crate::sample::ColorSample;
use crate::transform::grid::GridSampler;
use crate::transform::lut::Lut3D;
use crate::transform::params::SynthesisParams;

/// Parse and check a `before`/`after` hex list pair.
pub fn parse_correction_lists<S: AsRef<str>>(
    before_hex: &[S],
    after_hex: &[S],
) -> Result<(Vec<ColorSample>, Vec<ColorSample>), LutError> {
    if before_hex.is_empty() || after_hex.is_empty() {
        let field = if before_hex.is_empty() { "before_data" } else { "after_data" };
        return Err(LutError::InvalidInput(format!("{field} must not be empty")));
    }
    if before_hex.len() != after_hex.len() {
        return Err(LutError::InvalidInput(format!(
            "before_data has {} entries but after_data has {}",
            before_hex.len(),
            after_hex.len()
        )));
    }
    let before = ColorSample::parse_list("before_data", before_hex)?;
    let after = ColorSample::parse_list("after_data", after_hex)?;
    Ok((before, after))
}

/// Synthesize a LUT from reference (`before`) and captured (`after`) hex colors.
pub fn generate_lut<S: AsRef<str>>(
    before_hex: &[S],
    after_hex: &[S],
    params: &SynthesisParams,
) -> Result<Lut3D, LutError> {
    params.validate()?;
    let (before, after) = parse_correction_lists(before_hex, after_hex)?;
    generate_lut_from_samples(&before, &after, params)
}

/// Synthesize a LUT from already-parsed samples.
pub fn generate_lut_from_samples(
    before: &[ColorSample],
    after: &[ColorSample],
    params: &SynthesisParams,
) -> Result<Lut3D, LutError> {
    params.validate()?;
    let after = normalize(before, after)?;
    let pairs = zip_pairs(before, &after)?;
    let augmented = augment(&pairs, params);

    tracing::info!(
        pairs = pairs.len(),
        augmented = augmented.len(),
        size = params.lut_size,
        "generating LUT"
    );
    GridSampler::new(params).sample(&augmented)
}

/// Synthesize a LUT and render it as `.cube` text.
pub fn generate_cube<S: AsRef<str>>(
    before_hex: &[S],
    after_hex: &[S],
    params: &SynthesisParams,
) -> Result<String, LutError> {
    Ok(generate_lut(before_hex, after_hex, params)?.to_cube_string())
}

/// Correct an encoded image with a LUT synthesized from the hex lists.
///
/// The LUT reaches the image through its `.cube` text, so the applier sees
/// exactly what a downloaded file would contain. Returns PNG bytes.
pub fn apply_lut<S: AsRef<str>>(
    image_bytes: &[u8],
    before_hex: &[S],
    after_hex: &[S],
    params: &SynthesisParams,
) -> Result<Vec<u8>, LutError> {
    params.validate()?;
    let (before, after) = parse_correction_lists(before_hex, after_hex)?;
    let mut image = GradingImage::decode(image_bytes)?;

    let cube = generate_lut_from_samples(&before, &after, params)?.to_cube_string();
    let lut = Lut3D::parse_cube(&cube)?;

    image.apply_lut(&lut);
    tracing::info!(
        width = image.width,
        height = image.height,
        bit_depth = %image.source_bit_depth,
        "applied LUT to image"
    );
    image.encode_png()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_lengths_rejected() {
        let err = generate_lut(
            &["#000000", "#808080", "#FFFFFF"],
            &["#000000", "#FFFFFF"],
            &SynthesisParams::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_empty_lists_rejected() {
        let empty: [&str; 0] = [];
        let err = generate_lut(&empty, &empty, &SynthesisParams::default()).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_malformed_hex_names_field() {
        let err = parse_correction_lists(&["#000000", "#GGGGGG"], &["#000000", "#FFFFFF"]).unwrap_err();
        assert!(err.to_string().contains("before_data[1]"), "{err}");
    }

    #[test]
    fn test_bad_image_rejected_as_invalid_input() {
        let err = apply_lut(
            b"not an image",
            &["#000000", "#FFFFFF"],
            &["#101010", "#F0F0F0"],
            &SynthesisParams::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_small_grid_generation() {
        let params = SynthesisParams {
            lut_size: 5,
            ..Default::default()
        };
        let lut = generate_lut(
            &["#202020", "#C04040", "#40C040"],
            &["#282828", "#B04848", "#48B048"],
            &params,
        )
        .unwrap();
        assert_eq!(lut.size, 5);
        assert_eq!(lut.data.len(), 125);
        assert_eq!(lut.get(4, 4, 4), [1.0, 1.0, 1.0]);
    }
}
