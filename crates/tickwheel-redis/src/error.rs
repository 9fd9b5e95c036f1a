use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Only GET and POST callbacks are supported.
    #[error("Invalid method: {method}")]
    InvalidMethod { method: String },

    /// Callback URLs must carry an http:// or https:// scheme.
    #[error("Invalid url: {url}")]
    InvalidUrl { url: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Http error: {0}")]
    Http(#[from] tickwheel_http::HttpError),

    /// A script replied with a shape the store cannot interpret.
    #[error("Malformed script reply")]
    MalformedReply,
}

pub type Result<T> = std::result::Result<T, Error>;
