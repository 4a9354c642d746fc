//! Request dispatch: decode a client frame, run the core pipeline, frame the reply.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chartlut_core::image::GradingImage;
use chartlut_core::{LutError, SynthesisParams};

use crate::config::ServerConfig;
use crate::ipc::{CUBE_FILENAME, ClientRequest, IMAGE_FILENAME, ServerResponse};

/// Failures that end a request before a response payload exists.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Lut(#[from] LutError),
    #[error("request exceeded {0} seconds")]
    Timeout(u64),
    #[error("worker failed: {0}")]
    Worker(String),
}

impl RequestError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Lut(e) => e.kind(),
            Self::Timeout(_) => "timeout",
            Self::Worker(_) => "internal",
        }
    }
}

impl From<RequestError> for ServerResponse {
    fn from(err: RequestError) -> Self {
        ServerResponse::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Parse one text frame into a request.
pub fn parse_request(text: &str) -> Result<ClientRequest, RequestError> {
    serde_json::from_str(text)
        .map_err(|e| LutError::InvalidInput(format!("malformed request: {e}")).into())
}

/// Run a request to completion. Pure and blocking; call from a blocking worker.
pub fn handle_request(request: ClientRequest, config: &ServerConfig) -> Result<ServerResponse, RequestError> {
    let params = SynthesisParams::default();
    match request {
        ClientRequest::GenerateLut {
            before_data,
            after_data,
        } => {
            let before = required(before_data, "before_data")?;
            let after = required(after_data, "after_data")?;
            let cube = chartlut_core::generate_cube(&before, &after, &params)?;
            Ok(ServerResponse::LutGenerated {
                filename: CUBE_FILENAME.to_string(),
                cube,
            })
        }
        ClientRequest::ApplyLut {
            image_data,
            before_data,
            after_data,
        } => {
            let image_data = required(image_data, "image_data")?;
            let before = required(before_data, "before_data")?;
            let after = required(after_data, "after_data")?;
            chartlut_core::pipeline::parse_correction_lists(&before, &after)?;

            let bytes = BASE64
                .decode(image_data.trim())
                .map_err(|e| LutError::InvalidInput(format!("image_data: invalid base64: {e}")))?;
            check_image_size(&bytes, config.max_image_megapixels)?;

            let png = chartlut_core::apply_lut(&bytes, &before, &after, &params)?;
            Ok(ServerResponse::LutApplied {
                filename: IMAGE_FILENAME.to_string(),
                image_data: BASE64.encode(png),
            })
        }
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, LutError> {
    value.ok_or_else(|| LutError::InvalidInput(format!("missing field `{field}`")))
}

fn check_image_size(bytes: &[u8], max_megapixels: u64) -> Result<(), LutError> {
    let (width, height) = GradingImage::probe_dimensions(bytes)?;
    let pixels = u64::from(width) * u64::from(height);
    if pixels > max_megapixels.saturating_mul(1_000_000) {
        return Err(LutError::InvalidInput(format!(
            "image_data: {width}x{height} exceeds the {max_megapixels} MP limit"
        )));
    }
    Ok(())
}
