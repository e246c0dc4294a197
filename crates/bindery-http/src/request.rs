use std::mem;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, Uri};

use crate::body::Body;
use crate::form::{FormValues, FormView};
use crate::path::PathParams;
use crate::BodyError;

/// Media type of form-encoded bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// An inbound HTTP request as seen by the binder.
///
/// Query values are parsed once at construction. The body can be taken
/// exactly once via [`take_body()`](Request::take_body); a form-encoded
/// body, once read, is parsed back in through
/// [`set_body_form()`](Request::set_body_form) so its values join the
/// form source.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Option<Body>,
    path_params: PathParams,
    query: FormValues,
    body_form: FormValues,
}

impl Request {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: impl Into<Body>) -> Self {
        let query = uri
            .query()
            .map(|q| FormValues::parse(q.as_bytes()))
            .unwrap_or_default();
        Self {
            method,
            uri,
            headers,
            body: Some(body.into()),
            path_params: PathParams::new(),
            query,
            body_form: FormValues::new(),
        }
    }

    /// Create a request that carries no body at all.
    pub fn without_body(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self::new(method, uri, headers, Body::Absent)
    }

    /// Build from the head of an `http::Request` and a separately
    /// converted body.
    pub fn from_parts(parts: http::request::Parts, body: Body) -> Self {
        Self::new(parts.method, parts.uri, parts.headers, body)
    }

    /// Attach the placeholders an upstream router matched.
    pub fn with_path_params(mut self, params: PathParams) -> Self {
        self.path_params = params;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    pub fn query(&self) -> &FormValues {
        &self.query
    }

    /// Values parsed from a form-encoded body; empty until the body has
    /// been read and handed back.
    pub fn body_form(&self) -> &FormValues {
        &self.body_form
    }

    pub fn set_body_form(&mut self, form: FormValues) {
        self.body_form = form;
    }

    /// All form-encoded values in lookup order.
    pub fn form(&self) -> FormView<'_> {
        FormView::new(&self.body_form, &self.query)
    }

    /// The media type of the body without parameters, lower-cased.
    pub fn content_type(&self) -> Option<String> {
        let value = self.headers.get(CONTENT_TYPE)?.to_str().ok()?;
        let essence = value.split(';').next().unwrap_or_default().trim();
        Some(essence.to_ascii_lowercase())
    }

    pub fn is_form_encoded(&self) -> bool {
        self.content_type().as_deref() == Some(FORM_URLENCODED)
    }

    /// Take the body out of the request. Fails if it was taken before.
    pub fn take_body(&mut self) -> Result<Body, BodyError> {
        self.body.take().ok_or(BodyError::AlreadyConsumed)
    }

    /// Whether the body has not been taken yet.
    pub fn has_unread_body(&self) -> bool {
        self.body.is_some()
    }

    /// Replace the body, returning the previous one if it was unread.
    pub fn replace_body(&mut self, body: impl Into<Body>) -> Option<Body> {
        mem::replace(&mut self.body, Some(body.into()))
    }
}
