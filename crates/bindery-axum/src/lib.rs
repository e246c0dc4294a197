//! bindery-axum: plugs the binder into an `axum` router.
//!
//! - [`Unpacked<T>`]: extractor binding a record from path placeholders,
//!   query/form values and the JSON body.
//! - [`Envelope`]: the `{status, message, data}` reply every handler uses.

mod envelope;
mod extract;

pub use envelope::{Envelope, STATUS_ERROR, STATUS_OK};
pub use extract::{BindRejection, Unpacked};
