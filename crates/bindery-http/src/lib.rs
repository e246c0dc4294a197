//! Request abstraction consumed by the bindery binder.
//!
//! A [`Request`] carries the three value sources a binder reads from:
//!
//! - the [`Body`], buffered or streamed, which can be taken exactly once;
//! - [`PathParams`], the named placeholders an upstream router extracted
//!   from the matched URL pattern;
//! - [`FormValues`] parsed from the query string and, once the body has
//!   been read, from an `application/x-www-form-urlencoded` body.
//!
//! # Body Model
//!
//! Bodies arrive either fully buffered (tests, client-built requests) or as
//! a `Stream<Item = Result<Bytes, _>>` handed over by the server. Both are
//! drained through [`Body::collect`], which distinguishes an absent body
//! (`Ok(None)`) from an empty one (`Ok(Some(empty))`).

pub(crate) mod body;
mod error;
mod form;
mod path;
mod request;

pub use body::{Body, ByteStream};
pub use error::BodyError;
pub use form::{FormValues, FormView};
pub use path::PathParams;
pub use request::{Request, FORM_URLENCODED};
