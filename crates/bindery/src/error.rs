//! Binding error types.

use bindery_http::BodyError;
use thiserror::Error;

use crate::schema::ScalarKind;

/// Errors that abort a binding pass.
///
/// Every variant is fatal to the current [`unpack`](crate::Binder::unpack)
/// call. Unless the binder runs in atomic mode, fields assigned before the
/// failure stay assigned.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("request body is required but missing")]
    MissingBody,

    #[error("failed to read request body: {0}")]
    BodyRead(#[from] BodyError),

    #[error("failed to decode request body: {0}")]
    BodyDecode(#[from] serde_json::Error),

    #[error("unsupported field kind: {type_name}")]
    UnsupportedKind { type_name: String },

    #[error("{key}: cannot parse {raw:?} as {kind}: {reason}")]
    Coercion {
        key: String,
        raw: String,
        kind: ScalarKind,
        reason: String,
    },

    #[error("unsupported scalar type: {type_name}")]
    UnsupportedType { type_name: String },

    #[error("{key}: nesting exceeds the maximum depth of {max_depth}")]
    DepthExceeded { key: String, max_depth: usize },
}

impl BindError {
    /// The binding key the error is about, when there is one.
    pub fn key(&self) -> Option<&str> {
        match self {
            BindError::Coercion { key, .. } | BindError::DepthExceeded { key, .. } => {
                Some(key.as_str())
            }
            _ => None,
        }
    }

    /// Whether the error stems from a schema the binder cannot handle
    /// rather than from request data.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            BindError::UnsupportedKind { .. }
                | BindError::UnsupportedType { .. }
                | BindError::DepthExceeded { .. }
        )
    }
}

pub type BindResult<T> = Result<T, BindError>;
