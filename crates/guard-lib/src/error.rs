//! Error types for gateway communication

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection refused, DNS failure, timeout or body decoding failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered with an `{error}` envelope
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// True when the endpoint could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        match self {
            GatewayError::Transport(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
