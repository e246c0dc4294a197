//! The `{status, message, data}` response envelope.

use std::fmt;

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// `status` of a successful call.
pub const STATUS_OK: i32 = 0;
/// `status` of a failed call.
pub const STATUS_ERROR: i32 = -1;

/// Fixed JSON shape every handler answers with.
///
/// The HTTP status is always 200 and the outcome travels in `status`:
/// [`STATUS_OK`] with an empty `message`, or [`STATUS_ERROR`] with the
/// error text. `data` is omitted when there is none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    pub status: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: STATUS_OK,
            message: String::new(),
            data: Some(data),
        }
    }

    pub fn error(err: impl fmt::Display) -> Self {
        Self {
            status: STATUS_ERROR,
            message: err.to_string(),
            data: None,
        }
    }

    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::error(e),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Back to a `Result`, for callers decoding an envelope they received.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.is_ok() {
            Ok(self.data)
        } else {
            Err(self.message)
        }
    }
}

impl Envelope<()> {
    /// Success without data.
    pub fn empty() -> Self {
        Self {
            status: STATUS_OK,
            message: String::new(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        if !self.is_ok() {
            tracing::error!(message = %self.message, "request failed");
        }
        Json(self).into_response()
    }
}
