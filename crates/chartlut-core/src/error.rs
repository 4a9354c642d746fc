//! Error type shared by every stage of LUT synthesis and application.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LutError {
    /// Missing or mismatched correction lists, malformed hex, bad image payload.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Too few usable correspondences, or a singular interpolation system.
    #[error("cannot fit color field: {0}")]
    DegenerateFit(String),
    /// The `.cube` representation could not be written, read back, or stored.
    #[error("LUT serialization failed: {0}")]
    SerializationFailure(String),
}

impl LutError {
    /// Stable machine-readable tag for the error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::DegenerateFit(_) => "degenerate_fit",
            Self::SerializationFailure(_) => "serialization_failure",
        }
    }
}

impl From<std::io::Error> for LutError {
    fn from(err: std::io::Error) -> Self {
        Self::SerializationFailure(err.to_string())
    }
}
