//! Normalized RGB samples and hex color parsing.

use serde::{Deserialize, Serialize};

use crate::error::LutError;

/// A normalized RGB triple, nominally in `[0, 1]`.
///
/// Scaled and anchor samples produced during augmentation may leave the
/// unit cube; only the grid sampler clamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorSample(pub [f64; 3]);

impl ColorSample {
    pub const BLACK: Self = Self([0.0, 0.0, 0.0]);
    pub const WHITE: Self = Self([1.0, 1.0, 1.0]);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self([r, g, b])
    }

    /// Parse `#RRGGBB` or `RRGGBB`, case-insensitive.
    pub fn from_hex(hex: &str) -> Result<Self, HexParseError> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if digits.is_empty() {
            return Err(HexParseError::Empty);
        }
        let bytes = digits.as_bytes();
        if bytes.len() != 6 {
            return Err(HexParseError::InvalidLength(bytes.len()));
        }

        let mut rgb = [0.0; 3];
        for (c, pair) in bytes.chunks_exact(2).enumerate() {
            let hi = nibble(pair[0]).ok_or(HexParseError::InvalidDigit)?;
            let lo = nibble(pair[1]).ok_or(HexParseError::InvalidDigit)?;
            rgb[c] = f64::from(hi * 16 + lo) / 255.0;
        }
        Ok(Self(rgb))
    }

    /// Parse every entry of a named hex list, reporting the field and index of the first failure.
    pub fn parse_list<S: AsRef<str>>(field: &str, values: &[S]) -> Result<Vec<Self>, LutError> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                Self::from_hex(v.as_ref()).map_err(|e| {
                    LutError::InvalidInput(format!("{field}[{i}]: {:?} {e}", v.as_ref()))
                })
            })
            .collect()
    }

    pub const fn components(&self) -> [f64; 3] {
        self.0
    }

    pub fn scale(&self, m: f64) -> Self {
        Self(self.0.map(|v| v * m))
    }

    /// True when every component lies in the closed interval `[0, 1]`.
    pub fn in_unit_cube(&self) -> bool {
        self.0.iter().all(|v| (0.0..=1.0).contains(v))
    }

    pub fn min_component(&self) -> f64 {
        self.0[0].min(self.0[1]).min(self.0[2])
    }

    pub fn max_component(&self) -> f64 {
        self.0[0].max(self.0[1]).max(self.0[2])
    }
}

impl From<[f64; 3]> for ColorSample {
    fn from(rgb: [f64; 3]) -> Self {
        Self(rgb)
    }
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HexParseError {
    #[error("is empty")]
    Empty,
    #[error("has {0} hex digits, expected 6")]
    InvalidLength(usize),
    #[error("contains a non-hex digit")]
    InvalidDigit,
}
