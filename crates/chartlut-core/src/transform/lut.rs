//! 3D LUT storage, `.cube` file I/O, and trilinear application.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use crate::error::LutError;
use crate::transform::params::DEFAULT_TITLE;

/// Largest `LUT_3D_SIZE` accepted from a `.cube` file.
pub const MAX_CUBE_SIZE: usize = 256;

/// A 3D lookup table for fast color transform application.
///
/// Cell `(x, y, z)` is stored at `x + y·N + z·N²`, so the first axis varies
/// fastest, matching the order of the `.cube` data lines. The first axis is the
/// red input, the third the blue input.
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3D {
    /// Title written into the `.cube` header.
    pub title: String,
    /// Grid size per axis (typically 33 or 65).
    pub size: usize,
    /// LUT entries as RGB values. Length = size³.
    pub data: Vec<[f64; 3]>,
    /// Minimum domain values per channel.
    pub domain_min: [f64; 3],
    /// Maximum domain values per channel.
    pub domain_max: [f64; 3],
}

impl Lut3D {
    /// Identity LUT: cell `(i, j, k)` holds `(i, j, k) / (size − 1)`.
    ///
    /// Coordinates are computed in single precision and widened, so the grid
    /// positions match a float32 linspace.
    pub fn identity(size: usize) -> Self {
        let denom = size.saturating_sub(1).max(1) as f32;
        let mut data = Vec::with_capacity(size * size * size);
        for z in 0..size {
            for y in 0..size {
                for x in 0..size {
                    data.push([x, y, z].map(|i| f64::from(i as f32 / denom)));
                }
            }
        }
        Self {
            title: DEFAULT_TITLE.to_string(),
            size,
            data,
            domain_min: [0.0; 3],
            domain_max: [1.0; 3],
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.size + z * self.size * self.size
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> [f64; 3] {
        self.data[self.index(x, y, z)]
    }

    /// Render the `.cube` text: four header lines, then one line per cell.
    ///
    /// Lines are joined by `\n` without a trailing newline.
    pub fn to_cube_string(&self) -> String {
        let mut out = String::with_capacity(128 + self.data.len() * 27);
        let _ = write!(
            out,
            "TITLE \"{}\"\nLUT_3D_SIZE {}\nDOMAIN_MIN {:?} {:?} {:?}\nDOMAIN_MAX {:?} {:?} {:?}",
            self.title,
            self.size,
            self.domain_min[0],
            self.domain_min[1],
            self.domain_min[2],
            self.domain_max[0],
            self.domain_max[1],
            self.domain_max[2],
        );
        for [r, g, b] in &self.data {
            let _ = write!(out, "\n{r:.6} {g:.6} {b:.6}");
        }
        out
    }

    /// Write the `.cube` text to any sink.
    pub fn write_cube<W: Write>(&self, out: &mut W) -> Result<(), LutError> {
        out.write_all(self.to_cube_string().as_bytes())?;
        Ok(())
    }

    /// Parse `.cube` text.
    ///
    /// Accepts blank lines, `#` comments, and the header keywords in any order
    /// before the data. 1D LUTs are rejected.
    pub fn parse_cube(text: &str) -> Result<Self, LutError> {
        let mut title = DEFAULT_TITLE.to_string();
        let mut size: Option<usize> = None;
        let mut domain_min = [0.0; 3];
        let mut domain_max = [1.0; 3];
        let mut data: Vec<[f64; 3]> = Vec::new();

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fail = |what: &str| {
                LutError::SerializationFailure(format!("line {}: {what}: {line:?}", line_no + 1))
            };

            let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            match keyword {
                "TITLE" => title = rest.trim().trim_matches('"').to_string(),
                "LUT_3D_SIZE" => {
                    let n: usize = rest.trim().parse().map_err(|_| fail("bad LUT_3D_SIZE"))?;
                    if !(2..=MAX_CUBE_SIZE).contains(&n) {
                        return Err(fail("LUT_3D_SIZE out of range"));
                    }
                    size = Some(n);
                }
                "LUT_1D_SIZE" => return Err(fail("1D LUTs are not supported")),
                "DOMAIN_MIN" => domain_min = parse_triple(rest).ok_or_else(|| fail("bad DOMAIN_MIN"))?,
                "DOMAIN_MAX" => domain_max = parse_triple(rest).ok_or_else(|| fail("bad DOMAIN_MAX"))?,
                _ => {
                    if size.is_none() {
                        return Err(fail("data before LUT_3D_SIZE"));
                    }
                    let limit = size.and_then(cell_count).unwrap_or(0);
                    if data.len() >= limit {
                        return Err(fail("more data lines than LUT_3D_SIZE allows"));
                    }
                    data.push(parse_triple(line).ok_or_else(|| fail("bad data line"))?);
                }
            }
        }

        let size = size.ok_or_else(|| {
            LutError::SerializationFailure("missing LUT_3D_SIZE".to_string())
        })?;
        let expected = cell_count(size).ok_or_else(|| {
            LutError::SerializationFailure(format!("LUT_3D_SIZE {size} is too large"))
        })?;
        if data.len() != expected {
            return Err(LutError::SerializationFailure(format!(
                "expected {expected} data lines for size {size}, found {}",
                data.len()
            )));
        }
        if (0..3).any(|c| domain_max[c] <= domain_min[c]) {
            return Err(LutError::SerializationFailure(format!(
                "empty domain {domain_min:?}..{domain_max:?}"
            )));
        }

        Ok(Self {
            title,
            size,
            data,
            domain_min,
            domain_max,
        })
    }

    /// Load a 3D LUT from a `.cube` file.
    pub fn load_cube(path: &Path) -> Result<Self, LutError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_cube(&text)
    }

    /// Save this 3D LUT to a `.cube` file.
    pub fn save_cube(&self, path: &Path) -> Result<(), LutError> {
        let mut file = std::fs::File::create(path)?;
        self.write_cube(&mut file)?;
        file.flush()?;
        Ok(())
    }

    /// Apply this LUT to an RGB pixel using trilinear interpolation.
    ///
    /// Inputs outside the domain are clamped to it. A single-cell LUT maps every
    /// input to that cell; an empty LUT returns the input unchanged.
    pub fn apply(&self, rgb: [f64; 3]) -> [f64; 3] {
        if self.size < 2 {
            return self.data.first().copied().unwrap_or(rgb);
        }
        let max_index = (self.size - 1) as f64;
        let mut base = [0usize; 3];
        let mut frac = [0.0f64; 3];
        for c in 0..3 {
            let span = self.domain_max[c] - self.domain_min[c];
            let t = ((rgb[c] - self.domain_min[c]) / span).clamp(0.0, 1.0) * max_index;
            // NaN clamps to NaN; treat it as the domain minimum.
            let t = if t.is_nan() { 0.0 } else { t };
            let i = (t.floor() as usize).min(self.size - 2);
            base[c] = i;
            frac[c] = t - i as f64;
        }

        let [x0, y0, z0] = base;
        let [fx, fy, fz] = frac;
        let corner = |dx: usize, dy: usize, dz: usize| self.get(x0 + dx, y0 + dy, z0 + dz);

        let mut out = [0.0f64; 3];
        for c in 0..3 {
            let c00 = lerp(corner(0, 0, 0)[c], corner(1, 0, 0)[c], fx);
            let c10 = lerp(corner(0, 1, 0)[c], corner(1, 1, 0)[c], fx);
            let c01 = lerp(corner(0, 0, 1)[c], corner(1, 0, 1)[c], fx);
            let c11 = lerp(corner(0, 1, 1)[c], corner(1, 1, 1)[c], fx);
            let c0 = lerp(c00, c10, fy);
            let c1 = lerp(c01, c11, fy);
            out[c] = lerp(c0, c1, fz);
        }
        out
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn cell_count(size: usize) -> Option<usize> {
    size.checked_mul(size)?.checked_mul(size)
}

fn parse_triple(s: &str) -> Option<[f64; 3]> {
    let mut it = s.split_whitespace().map(|v| v.parse::<f64>().ok());
    let triple = [it.next()??, it.next()??, it.next()??];
    if it.next().is_some() || triple.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(triple)
}
