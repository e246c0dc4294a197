use http::StatusCode;
use thiserror::Error;

/// Failure of one outbound call.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("url has no host: {0}")]
    MissingHost(String),

    #[error("unsupported scheme {0:?}, only plain http is supported")]
    UnsupportedScheme(String),

    #[error("failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid header {name:?}")]
    InvalidHeader { name: String },

    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("http error: {0}")]
    Http(#[from] hyper::Error),

    #[error("failed to build request: {0}")]
    Request(#[from] http::Error),

    #[error("server answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode reply: {0}")]
    Decode(#[source] serde_json::Error),
}

pub type SendResult<T> = Result<T, SendError>;
