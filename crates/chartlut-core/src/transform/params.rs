//! Parameters that fully determine a synthesized LUT.
//!
//! `SynthesisParams::default()` reproduces the fixed constants of the wire
//! contract; requests never override them.

use serde::{Deserialize, Serialize};

use crate::error::LutError;

/// Default grid resolution per axis.
pub const DEFAULT_LUT_SIZE: usize = 65;
/// Default kernel shape parameter.
pub const DEFAULT_EPSILON: f64 = 0.05;
/// Default smoothing subtracted from the interpolation matrix diagonal.
pub const DEFAULT_SMOOTH: f64 = 3.0;
/// Default title written into the `.cube` header.
pub const DEFAULT_TITLE: &str = "Deformed LUT";

/// Radial basis kernel `φ(r)` used by the field fitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RbfKernel {
    /// `sqrt((r/ε)² + 1)`.
    #[default]
    Multiquadric,
    /// `1 / sqrt((r/ε)² + 1)`.
    #[serde(alias = "inverse")]
    InverseMultiquadric,
    /// `exp(-(r/ε)²)`.
    Gaussian,
    /// `r`.
    Linear,
    /// `r³`.
    Cubic,
    /// `r⁵`.
    Quintic,
    /// `r² ln r`, zero at the origin.
    ThinPlate,
}

impl RbfKernel {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Multiquadric => "multiquadric",
            Self::InverseMultiquadric => "inverse_multiquadric",
            Self::Gaussian => "gaussian",
            Self::Linear => "linear",
            Self::Cubic => "cubic",
            Self::Quintic => "quintic",
            Self::ThinPlate => "thin_plate",
        }
    }

    pub fn all() -> &'static [Self] {
        const ALL: [RbfKernel; 7] = [
            RbfKernel::Multiquadric,
            RbfKernel::InverseMultiquadric,
            RbfKernel::Gaussian,
            RbfKernel::Linear,
            RbfKernel::Cubic,
            RbfKernel::Quintic,
            RbfKernel::ThinPlate,
        ];
        &ALL
    }

    /// Evaluate the kernel at distance `r` with shape parameter `epsilon`.
    #[inline]
    pub fn eval(self, r: f64, epsilon: f64) -> f64 {
        match self {
            Self::Multiquadric => ((r / epsilon).powi(2) + 1.0).sqrt(),
            Self::InverseMultiquadric => 1.0 / ((r / epsilon).powi(2) + 1.0).sqrt(),
            Self::Gaussian => (-(r / epsilon).powi(2)).exp(),
            Self::Linear => r,
            Self::Cubic => r.powi(3),
            Self::Quintic => r.powi(5),
            Self::ThinPlate => {
                if r > 0.0 {
                    r * r * r.ln()
                } else {
                    0.0
                }
            }
        }
    }
}

impl std::str::FromStr for RbfKernel {
    type Err = LutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name == "inverse" {
            return Ok(Self::InverseMultiquadric);
        }
        Self::all()
            .iter()
            .copied()
            .find(|k| k.label() == name)
            .ok_or_else(|| LutError::InvalidInput(format!("unknown RBF kernel {s:?}")))
    }
}

/// Every knob of the synthesis pipeline, from augmentation through sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisParams {
    /// Grid points per axis. Must be at least 2.
    pub lut_size: usize,
    /// Kernel shape.
    pub kernel: RbfKernel,
    /// Kernel shape parameter ε.
    pub epsilon: f64,
    /// Trades exact interpolation for smoothness. 0.0 = interpolate exactly.
    pub smooth: f64,
    /// Weight of the fitted field against identity. 1.0 = field only.
    pub blend: f64,
    /// Inclusive multiplier range used to scale each pair during augmentation.
    pub multiplier_range: (f64, f64),
    /// Number of multipliers spread over `multiplier_range`.
    pub multiplier_steps: usize,
    /// Scale applied to the cube corners to form their anchor targets.
    pub corner_scale: f64,
    /// Identity coordinates within this distance of 1.0 are snapped back to identity.
    pub snap_tolerance: f64,
    /// Title written into the `.cube` header.
    pub title: String,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            lut_size: DEFAULT_LUT_SIZE,
            kernel: RbfKernel::Multiquadric,
            epsilon: DEFAULT_EPSILON,
            smooth: DEFAULT_SMOOTH,
            blend: 1.0,
            multiplier_range: (0.6, 2.0),
            multiplier_steps: 20,
            corner_scale: 1.10,
            snap_tolerance: 1e-5,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl SynthesisParams {
    /// Reject parameter combinations that cannot produce a well-formed LUT.
    pub fn validate(&self) -> Result<(), LutError> {
        if self.lut_size < 2 {
            return Err(LutError::InvalidInput(format!(
                "lut_size must be at least 2, got {}",
                self.lut_size
            )));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(LutError::InvalidInput(format!(
                "epsilon must be finite and positive, got {}",
                self.epsilon
            )));
        }
        let finite = [
            ("smooth", self.smooth),
            ("blend", self.blend),
            ("corner_scale", self.corner_scale),
            ("snap_tolerance", self.snap_tolerance),
            ("multiplier_range.0", self.multiplier_range.0),
            ("multiplier_range.1", self.multiplier_range.1),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(LutError::InvalidInput(format!("{name} must be finite, got {value}")));
        }
        if self.multiplier_steps == 0 {
            return Err(LutError::InvalidInput(
                "multiplier_steps must be at least 1".to_string(),
            ));
        }
        if self.title.contains(['"', '\n', '\r']) {
            return Err(LutError::InvalidInput(
                "title must not contain quotes or line breaks".to_string(),
            ));
        }
        Ok(())
    }
}
