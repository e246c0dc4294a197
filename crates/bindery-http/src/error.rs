use thiserror::Error;

/// Failure while reading a request body.
///
/// Stream errors are flattened to their message so the error stays
/// `Clone` and independent of whichever server produced the stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BodyError {
    #[error("body stream failed: {0}")]
    Stream(String),

    #[error("request body was already consumed")]
    AlreadyConsumed,
}

impl BodyError {
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }
}
