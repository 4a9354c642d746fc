//! Image representation for applying a LUT to raster data.

use std::fmt;
use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, ImageReader, Rgb, Rgba};
use serde::{Deserialize, Serialize};

use crate::error::LutError;
use crate::transform::lut::Lut3D;

/// Channel precision of the decoded source, used to pick the output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitDepth {
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit floating point.
    F32,
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => write!(f, "8-bit"),
            Self::U16 => write!(f, "16-bit"),
            Self::F32 => write!(f, "32-bit float"),
        }
    }
}

/// Decoded raster. Pixels are stored as RGBA f32 in the source's encoding (not linearized).
#[derive(Debug, Clone)]
pub struct GradingImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data in RGBA f32, nominally `[0, 1]`.
    pub pixels: Vec<[f32; 4]>,
    /// Original bit depth of the source image.
    pub source_bit_depth: BitDepth,
    /// Whether the source carried an alpha channel.
    pub has_alpha: bool,
}

impl GradingImage {
    /// Read only the header to get `(width, height)`.
    pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32), LutError> {
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| LutError::InvalidInput(format!("image_data: {e}")))?
            .into_dimensions()
            .map_err(|e| LutError::InvalidInput(format!("image_data: {e}")))
    }

    /// Decode an encoded raster (PNG, JPEG, TIFF, ...) from memory.
    pub fn decode(bytes: &[u8]) -> Result<Self, LutError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| LutError::InvalidInput(format!("image_data: failed to decode image: {e}")))?;

        let color = img.color();
        let source_bit_depth = match color {
            image::ColorType::L16
            | image::ColorType::La16
            | image::ColorType::Rgb16
            | image::ColorType::Rgba16 => BitDepth::U16,
            image::ColorType::Rgb32F | image::ColorType::Rgba32F => BitDepth::F32,
            _ => BitDepth::U8,
        };

        let rgba = img.to_rgba32f();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.pixels().map(|p| p.0).collect();

        Ok(Self {
            width,
            height,
            pixels,
            source_bit_depth,
            has_alpha: color.has_alpha(),
        })
    }

    /// Transform every pixel's RGB through `lut`. Alpha is untouched.
    pub fn apply_lut(&mut self, lut: &Lut3D) {
        for px in &mut self.pixels {
            let [r, g, b] = lut.apply([px[0], px[1], px[2]].map(f64::from));
            px[0] = r as f32;
            px[1] = g as f32;
            px[2] = b as f32;
        }
    }

    /// Encode losslessly as PNG, keeping dimensions and RGB/RGBA layout.
    ///
    /// 8-bit sources stay 8-bit; 16-bit and float sources are written as 16-bit.
    pub fn encode_png(&self) -> Result<Vec<u8>, LutError> {
        let dynamic = match (self.source_bit_depth, self.has_alpha) {
            (BitDepth::U8, false) => {
                let raw = self.quantize(3, 255.0, |v| v as u8);
                DynamicImage::ImageRgb8(self.buffer::<Rgb<u8>>(raw)?)
            }
            (BitDepth::U8, true) => {
                let raw = self.quantize(4, 255.0, |v| v as u8);
                DynamicImage::ImageRgba8(self.buffer::<Rgba<u8>>(raw)?)
            }
            (_, false) => {
                let raw = self.quantize(3, 65535.0, |v| v as u16);
                DynamicImage::ImageRgb16(self.buffer::<Rgb<u16>>(raw)?)
            }
            (_, true) => {
                let raw = self.quantize(4, 65535.0, |v| v as u16);
                DynamicImage::ImageRgba16(self.buffer::<Rgba<u16>>(raw)?)
            }
        };

        let mut out = Cursor::new(Vec::new());
        dynamic
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| LutError::SerializationFailure(format!("failed to encode PNG: {e}")))?;
        Ok(out.into_inner())
    }

    fn quantize<T>(&self, channels: usize, scale: f32, cast: impl Fn(f32) -> T) -> Vec<T> {
        let cast = &cast;
        self.pixels
            .iter()
            .flat_map(move |px| {
                px[..channels]
                    .iter()
                    .map(move |v| cast((v.clamp(0.0, 1.0) * scale).round()))
            })
            .collect()
    }

    fn buffer<P: image::Pixel>(
        &self,
        raw: Vec<P::Subpixel>,
    ) -> Result<ImageBuffer<P, Vec<P::Subpixel>>, LutError> {
        ImageBuffer::from_raw(self.width, self.height, raw).ok_or_else(|| {
            LutError::SerializationFailure(format!(
                "pixel buffer does not match {}x{}",
                self.width, self.height
            ))
        })
    }
}
