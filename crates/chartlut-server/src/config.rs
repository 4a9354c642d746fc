//! Runtime configuration for the LUT service.

use std::time::Duration;

/// Default listen address.
const DEFAULT_BIND: &str = "127.0.0.1";
/// Default WebSocket port.
const DEFAULT_PORT: u16 = 9410;
/// Default hard limit on one request's processing time.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
/// Default upper bound on decoded image size.
const DEFAULT_MAX_IMAGE_MEGAPIXELS: u64 = 100;
/// Default number of requests allowed to run at once.
const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 4;

/// Runtime configuration, read from `CHARTLUT_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Interface to listen on.
    pub bind: String,
    /// WebSocket port.
    pub port: u16,
    /// Requests running longer than this are abandoned with an error response.
    pub request_timeout: Duration,
    /// Images larger than this many megapixels are rejected before decoding.
    pub max_image_megapixels: u64,
    /// Requests beyond this many wait for a running one (or its abandoned worker) to finish.
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl ServerConfig {
    /// Build from an arbitrary key lookup. Unset or unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bind: lookup("CHARTLUT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port: lookup("CHARTLUT_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            request_timeout: Duration::from_secs(
                lookup("CHARTLUT_REQUEST_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            max_image_megapixels: lookup("CHARTLUT_MAX_IMAGE_MEGAPIXELS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_IMAGE_MEGAPIXELS),
            max_concurrent_requests: lookup("CHARTLUT_MAX_CONCURRENT_REQUESTS")
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
