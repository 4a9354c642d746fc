//! Chartlut Core — color-correction LUT synthesis.
//!
//! Turns a sparse set of color checker correspondences into a dense 3D LUT:
//! normalize and augment the correspondences, fit a radial basis field
//! through them, sample it on a regular grid, and serialize the grid as
//! `.cube`. The same LUT can be pushed through an image. No transport or
//! framework dependencies.

pub mod correction;
pub mod error;
pub mod image;
pub mod pipeline;
pub mod sample;
pub mod transform;

// Re-exports for convenience.
pub use crate::correction::{CorrespondencePair, CorrespondenceSet};
pub use crate::error::LutError;
pub use crate::image::{BitDepth, GradingImage};
pub use crate::pipeline::{apply_lut, generate_cube, generate_lut};
pub use crate::sample::ColorSample;
pub use crate::transform::grid::GridSampler;
pub use crate::transform::lut::Lut3D;
pub use crate::transform::params::{RbfKernel, SynthesisParams};
pub use crate::transform::rbf::ColorField;
