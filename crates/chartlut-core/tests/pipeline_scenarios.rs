//! End-to-end scenarios for LUT synthesis, serialization and application.
//!
//! Run with: `cargo test -p chartlut-core`

use std::io::Cursor;

use chartlut_core::correction::augment::{augment, multipliers};
use chartlut_core::correction::normalize::{normalize, scalar_range};
use chartlut_core::{
    ColorSample, CorrespondencePair, GridSampler, Lut3D, LutError, SynthesisParams, apply_lut,
    generate_cube, generate_lut,
};

fn params(size: usize) -> SynthesisParams {
    SynthesisParams {
        lut_size: size,
        ..Default::default()
    }
}

/// A 6-patch chart whose capture is slightly warm and flat.
fn warm_chart() -> (Vec<&'static str>, Vec<&'static str>) {
    (
        vec!["#735244", "#C29682", "#627A9D", "#576C43", "#F3F3F2", "#343434"],
        vec!["#7A5540", "#C89A7A", "#66789A", "#5C6E40", "#F0EEE8", "#3A3632"],
    )
}

#[test]
fn test_contrast_reduction_scenario_full_size() {
    let cube = generate_cube(
        &["#000000", "#FFFFFF"],
        &["#101010", "#F0F0F0"],
        &SynthesisParams::default(),
    )
    .unwrap();

    let lines: Vec<&str> = cube.lines().collect();
    assert_eq!(lines.len(), 4 + 65 * 65 * 65);
    assert_eq!(lines[0], "TITLE \"Deformed LUT\"");
    assert_eq!(lines[1], "LUT_3D_SIZE 65");
    assert_eq!(lines[2], "DOMAIN_MIN 0.0 0.0 0.0");
    assert_eq!(lines[3], "DOMAIN_MAX 1.0 1.0 1.0");
    assert_eq!(*lines.last().unwrap(), "1.000000 1.000000 1.000000");

    // Smoothing keeps the fit off the normalized anchors, so the origin lifts slightly.
    let origin: Vec<f64> = lines[4].split(' ').map(|v| v.parse().unwrap()).collect();
    assert!(origin.iter().all(|v| (v - 0.002549).abs() < 1e-6), "origin {origin:?}");
}

#[test]
fn test_default_fit_pins_known_cells() {
    let (before, after) = warm_chart();
    let lut = generate_lut(&before, &after, &SynthesisParams::default()).unwrap();
    let expected = [
        ((10, 20, 30), [0.173094, 0.312643, 0.474712]),
        ((50, 5, 40), [0.831564, 0.087842, 0.645015]),
    ];
    for ((x, y, z), want) in expected {
        let got = lut.get(x, y, z);
        for c in 0..3 {
            assert!((got[c] - want[c]).abs() < 1e-6, "cell ({x},{y},{z}) = {got:?}, expected {want:?}");
        }
    }
    assert_eq!(lut.get(64, 10, 10)[0], 1.0);
}

#[test]
fn test_mismatched_length_yields_invalid_input() {
    let err = generate_lut(
        &["#000000", "#777777", "#FFFFFF"],
        &["#000000", "#FFFFFF"],
        &SynthesisParams::default(),
    )
    .unwrap_err();
    assert!(matches!(err, LutError::InvalidInput(_)), "{err:?}");
}

#[test]
fn test_boundary_invariance_for_real_chart() {
    let (before, after) = warm_chart();
    let p = params(11);
    let lut = generate_lut(&before, &after, &p).unwrap();
    let last = p.lut_size - 1;
    for z in 0..p.lut_size {
        for y in 0..p.lut_size {
            for x in 0..p.lut_size {
                let v = lut.get(x, y, z);
                assert!(v.iter().all(|c| (0.0..=1.0).contains(c)), "({x},{y},{z}) = {v:?}");
                if x == last {
                    assert_eq!(v[0], 1.0);
                }
                if y == last {
                    assert_eq!(v[1], 1.0);
                }
                if z == last {
                    assert_eq!(v[2], 1.0);
                }
            }
        }
    }
}

#[test]
fn test_lut_moves_colors_toward_capture() {
    let (before, after) = warm_chart();
    let lut = generate_lut(&before, &after, &params(17)).unwrap();
    let identity = Lut3D::identity(17);
    let moved = lut
        .data
        .iter()
        .zip(&identity.data)
        .filter(|(a, b)| (0..3).any(|c| (a[c] - b[c]).abs() > 1e-3))
        .count();
    assert!(moved > 0, "a non-trivial chart must deform the grid");
}

#[test]
fn test_identity_grid_for_empty_set_all_sizes() {
    for size in [2, 4, 8, 33] {
        let p = params(size);
        let lut = GridSampler::new(&p).sample(&[]).unwrap();
        let denom = (size - 1) as f32;
        for z in 0..size {
            for y in 0..size {
                for x in 0..size {
                    let expected = [x, y, z].map(|i| f64::from(i as f32 / denom));
                    assert_eq!(lut.get(x, y, z), expected);
                }
            }
        }
    }
}

#[test]
fn test_cube_file_round_trip_on_disk() {
    let (before, after) = warm_chart();
    let lut = generate_lut(&before, &after, &params(9)).unwrap();
    let path = std::env::temp_dir().join(format!("chartlut-it-{}.cube", std::process::id()));
    lut.save_cube(&path).unwrap();
    let loaded = Lut3D::load_cube(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.size, 9);
    for (a, b) in loaded.data.iter().zip(&lut.data) {
        for c in 0..3 {
            assert!((a[c] - b[c]).abs() <= 5e-7);
        }
    }
}

#[test]
fn test_apply_lut_keeps_dimensions() {
    let img = image::RgbImage::from_fn(13, 7, |x, y| image::Rgb([(x * 19) as u8, (y * 36) as u8, 90]));
    let mut png = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut png, image::ImageFormat::Png)
        .unwrap();

    let (before, after) = warm_chart();
    let out = apply_lut(png.get_ref(), &before, &after, &params(9)).unwrap();
    let decoded = image::load_from_memory_with_format(&out, image::ImageFormat::Png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (13, 7));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> impl Strategy<Value = ColorSample> {
        (0.0_f64..=1.0, 0.0_f64..=1.0, 0.0_f64..=1.0).prop_map(|(r, g, b)| ColorSample::new(r, g, b))
    }

    fn pairs(max: usize) -> impl Strategy<Value = Vec<CorrespondencePair>> {
        prop::collection::vec((sample(), sample()), 1..=max)
            .prop_map(|v| v.into_iter().map(|(b, a)| CorrespondencePair::new(b, a)).collect())
    }

    proptest! {
        #[test]
        fn augmentation_keeps_exactly_in_range_scales(input in pairs(6)) {
            let p = SynthesisParams::default();
            let out = augment(&input, &p);
            let mut expected = Vec::new();
            for pair in &input {
                for m in multipliers(p.multiplier_range, p.multiplier_steps) {
                    let (b, a) = (pair.before.scale(m), pair.after.scale(m));
                    if b.in_unit_cube() && a.in_unit_cube() {
                        expected.push(CorrespondencePair::new(b, a));
                    }
                }
            }
            prop_assert_eq!(out.len(), expected.len() + 8);
            prop_assert_eq!(&out[..expected.len()], &expected[..]);
        }

        #[test]
        fn normalization_is_idempotent(input in pairs(8)) {
            let before: Vec<ColorSample> = input.iter().map(|p| p.before).collect();
            let after: Vec<ColorSample> = input.iter().map(|p| p.after).collect();
            let once = normalize(&before, &after).unwrap();
            let twice = normalize(&before, &once).unwrap();
            for (a, b) in once.iter().zip(&twice) {
                for c in 0..3 {
                    prop_assert!((a.0[c] - b.0[c]).abs() < 1e-9, "{} vs {}", a.0[c], b.0[c]);
                }
            }
            let (lo, hi) = scalar_range(&once).unwrap();
            let (blo, bhi) = scalar_range(&before).unwrap();
            let (alo, ahi) = scalar_range(&after).unwrap();
            if ahi > alo {
                prop_assert!((lo - blo).abs() < 1e-9 && (hi - bhi).abs() < 1e-9);
            }
        }

        #[test]
        fn serialization_round_trips_to_six_decimals(
            values in prop::collection::vec((0.0_f64..=1.0, 0.0_f64..=1.0, 0.0_f64..=1.0), 27)
        ) {
            let mut lut = Lut3D::identity(3);
            for (cell, (r, g, b)) in lut.data.iter_mut().zip(values) {
                *cell = [r, g, b];
            }
            let text = lut.to_cube_string();
            prop_assert_eq!(text.lines().count(), 4 + 27);
            let parsed = Lut3D::parse_cube(&text).unwrap();
            for (a, b) in parsed.data.iter().zip(&lut.data) {
                for c in 0..3 {
                    prop_assert!((a[c] - b[c]).abs() <= 5e-7);
                }
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn sampled_grid_is_contained_and_snapped(input in pairs(4)) {
            let p = params(5);
            let augmented = augment(&input, &p);
            let lut = GridSampler::new(&p).sample(&augmented).unwrap();
            for z in 0..5 {
                for y in 0..5 {
                    for x in 0..5 {
                        let v = lut.get(x, y, z);
                        prop_assert!(v.iter().all(|c| (0.0..=1.0).contains(c)));
                        for (c, idx) in [x, y, z].into_iter().enumerate() {
                            if idx == 4 {
                                prop_assert_eq!(v[c], 1.0);
                            }
                        }
                    }
                }
            }
        }
    }
}
