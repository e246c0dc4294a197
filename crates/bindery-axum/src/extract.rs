//! The [`Unpacked`] extractor.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use axum::body::HttpBody;
use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{FromRequest, FromRequestParts, RawPathParams, Request};
use axum::http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use axum::http::{request::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use bindery::{BindError, Binder, BinderConfig, Logger, Record};
use bindery_http::{Body, PathParams};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::envelope::Envelope;

/// A `T::default()` bound from the request by [`Binder`].
///
/// Path placeholders come from the matched route. A [`BinderConfig`] and
/// an `Arc<dyn Logger>` are taken from request extensions when present
/// (install them with `axum::Extension`), defaults otherwise.
///
/// ```no_run
/// use axum::{routing::post, Router};
/// use bindery::record;
/// use bindery_axum::{Envelope, Unpacked};
///
/// #[derive(Default, serde::Serialize, serde::Deserialize)]
/// struct Rename {
///     id: u64,
///     name: String,
/// }
///
/// record!(Rename { id, name });
///
/// async fn rename(Unpacked(req): Unpacked<Rename>) -> Envelope<Rename> {
///     Envelope::ok(req)
/// }
///
/// let app: Router = Router::new().route("/members/{id}", post(rename));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unpacked<T>(pub T);

impl<T> Unpacked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Unpacked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Unpacked<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

/// Rejection of [`Unpacked`]: HTTP 400 with an error [`Envelope`].
#[derive(Debug, thiserror::Error)]
pub enum BindRejection {
    /// The binder failed.
    #[error(transparent)]
    Bind(#[from] BindError),
    /// The matched route's placeholders could not be read.
    #[error(transparent)]
    Path(RawPathParamsRejection),
}

impl BindRejection {
    pub fn bind_error(&self) -> Option<&BindError> {
        match self {
            BindRejection::Bind(e) => Some(e),
            BindRejection::Path(_) => None,
        }
    }
}

impl IntoResponse for BindRejection {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "request binding rejected");
        (StatusCode::BAD_REQUEST, axum::Json(Envelope::<()>::error(&self))).into_response()
    }
}

impl<S, T> FromRequest<S> for Unpacked<T>
where
    S: Send + Sync,
    T: Record + Default + Serialize + DeserializeOwned + Send,
{
    type Rejection = BindRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let path = path_params(&mut parts, state).await?;
        let config = parts
            .extensions
            .get::<BinderConfig>()
            .cloned()
            .unwrap_or_default();
        let logger = parts.extensions.get::<Arc<dyn Logger>>().cloned();

        let body = if is_absent(&parts, &body) {
            Body::Absent
        } else {
            Body::from_stream(body.into_data_stream())
        };
        let mut request = bindery_http::Request::from_parts(parts, body).with_path_params(path);

        let mut binder = Binder::new(&mut request).with_config(config);
        if let Some(logger) = logger {
            binder = binder.with_logger(logger);
        }
        let mut value = T::default();
        binder.unpack(Some(&mut value)).await?;
        Ok(Unpacked(value))
    }
}

/// Placeholders of the matched route. A route without any binds none; a
/// placeholder that does not decode rejects the request.
async fn path_params<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
) -> Result<PathParams, BindRejection> {
    match RawPathParams::from_request_parts(parts, state).await {
        Ok(raw) => Ok(raw.iter().collect()),
        Err(RawPathParamsRejection::MissingPathParams(_)) => Ok(PathParams::new()),
        Err(e) => Err(BindRejection::Path(e)),
    }
}

/// No framing headers and nothing to read.
fn is_absent(parts: &Parts, body: &axum::body::Body) -> bool {
    !parts.headers.contains_key(CONTENT_LENGTH)
        && !parts.headers.contains_key(TRANSFER_ENCODING)
        && body.is_end_stream()
}
