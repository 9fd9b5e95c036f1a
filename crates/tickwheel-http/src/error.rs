use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid method: {method}")]
    InvalidMethod { method: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status: {status}")]
    Status { status: u16 },

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HttpError>;
