//! Field fitting, grid sampling, and LUT operations.

pub mod grid;
pub mod lut;
pub mod params;
pub mod rbf;
