//! bindery-client: outbound JSON calls.
//!
//! [`Sender`] builds one GET or POST, fires it over a fresh HTTP/1.1
//! connection and decodes the JSON reply into a typed value. Plain `http`
//! only: no pooling, no retries, no TLS.
//!
//! ```no_run
//! # async fn run() -> bindery_client::SendResult<()> {
//! use bindery_client::Sender;
//!
//! #[derive(serde::Deserialize)]
//! struct Member {
//!     name: String,
//! }
//!
//! let member: Member = Sender::get("http://127.0.0.1:8080/members/7")?
//!     .header("x-request-id", "abc")
//!     .param("fields", "name")
//!     .send()
//!     .await?;
//! # let _ = member.name;
//! # Ok(())
//! # }
//! ```

mod error;
mod sender;

pub use error::{SendError, SendResult};
pub use sender::Sender;
