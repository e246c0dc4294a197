//! bindery: request-parameter binding for typed records.
//!
//! Fills a destination record from up to three sources of an inbound
//! [`Request`](bindery_http::Request): a JSON body, path placeholders
//! supplied by a router, and query/form-encoded values.
//!
//! # Architecture
//!
//! ```text
//! Binder::unpack(destination)
//!   ├── body: absent / form-encoded / JSON deep-merge onto destination
//!   └── FieldWalker over the destination's static Schema
//!       └── per leaf: ValueResolver (path → form → query) → coerce()
//! ```
//!
//! # Precedence
//!
//! The body is applied first and supplies bulk values. Path and form
//! values are applied afterwards and win for every key they carry, so a
//! URL-identified resource id overrides a stale id in the body.
//!
//! # Schemas
//!
//! Records describe themselves through a static [`Schema`] built once per
//! type, usually with the [`record!`] macro:
//!
//! ```
//! use bindery::record;
//!
//! #[derive(Default, serde::Serialize)]
//! struct Page {
//!     number: u32,
//!     size: u32,
//!     sort_by: Option<String>,
//! }
//!
//! record!(Page { number = "page", size, sort_by = "sort" });
//! ```

pub mod binder;
pub mod coerce;
pub mod config;
mod error;
pub mod logger;
mod merge;
pub mod resolve;
pub mod schema;
mod walker;

pub use binder::{Binder, Outcome};
pub use coerce::{coerce, ScalarValue};
pub use config::{BinderConfig, BodyMode, SequenceKeys};
pub use error::{BindError, BindResult};
pub use logger::{Logger, NoopLogger, TracingLogger};
pub use resolve::ValueResolver;
pub use schema::{
    FieldDescriptor, Field, OptionalField, Record, ScalarField, ScalarKind, Schema, Slot,
    ValueKind,
};
