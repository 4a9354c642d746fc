//! Message contracts between WebSocket clients and the LUT service.
//!
//! Both directions use `#[serde(tag = "type", content = "data")]`, so every
//! frame reads as `{"type": "...", "data": {...}}`.

use serde::{Deserialize, Serialize};

/// Attachment name for a generated `.cube` file.
pub const CUBE_FILENAME: &str = "deformed_lut.cube";
/// Attachment name for a corrected image.
pub const IMAGE_FILENAME: &str = "image-with-lut-applied.png";

/// Requests from a client.
///
/// List fields are optional at the wire level so a missing field can be
/// reported by name instead of as a generic parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientRequest {
    /// Synthesize a LUT and return it as `.cube` text.
    GenerateLut {
        /// Reference chart colors as `#RRGGBB`.
        #[serde(default)]
        before_data: Option<Vec<String>>,
        /// Captured chart colors as `#RRGGBB`, paired by index with `before_data`.
        #[serde(default)]
        after_data: Option<Vec<String>>,
    },

    /// Synthesize a LUT and apply it to an image.
    ApplyLut {
        /// Base64-encoded raster image.
        #[serde(default)]
        image_data: Option<String>,
        /// Reference chart colors as `#RRGGBB`.
        #[serde(default)]
        before_data: Option<Vec<String>>,
        /// Captured chart colors as `#RRGGBB`.
        #[serde(default)]
        after_data: Option<Vec<String>>,
    },
}

/// Responses to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerResponse {
    /// A generated LUT.
    LutGenerated {
        /// Suggested file name.
        filename: String,
        /// Complete `.cube` file contents.
        cube: String,
    },

    /// A corrected image.
    LutApplied {
        /// Suggested file name.
        filename: String,
        /// Base64-encoded PNG with the source's dimensions.
        image_data: String,
    },

    /// The request failed; nothing partial is returned.
    Error {
        /// `invalid_input`, `degenerate_fit`, `serialization_failure`, `timeout`, or `internal`.
        kind: String,
        /// Human-readable description naming the offending field where possible.
        message: String,
    },
}
