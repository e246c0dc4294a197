//! Request body primitives.
//!
//! Provides the [`Body`] enum (absent, buffered or streaming), the
//! [`ErrIntoStream`] adapter that normalizes foreign stream errors into
//! [`BodyError`], and a `poll_fn`-based collector so no `futures-util`
//! runtime dependency is needed.

use std::fmt;
use std::future::poll_fn;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_core::Stream;

use crate::BodyError;

/// A type-erased, fallible stream of body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BodyError>> + Send>>;

/// The body of an inbound request.
///
/// `Absent` and an empty `Buffered` body are different things: the first
/// means the request carries no body at all, the second a zero-length one.
pub enum Body {
    /// No body was attached to the request.
    Absent,
    /// The whole body is already in memory.
    Buffered(Bytes),
    /// The body is pulled chunk by chunk from the transport.
    Streaming(ByteStream),
}

impl Body {
    /// A present but zero-length body.
    pub fn empty() -> Self {
        Body::Buffered(Bytes::new())
    }

    /// Wrap a foreign chunk stream, converting its errors to [`BodyError`].
    pub fn from_stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: fmt::Display,
    {
        Body::Streaming(Box::pin(ErrIntoStream {
            inner: Box::pin(stream),
        }))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Body::Absent)
    }

    /// Read the body to completion.
    ///
    /// Returns `Ok(None)` for [`Body::Absent`]. The first stream error
    /// aborts the read; chunks received before it are discarded.
    pub async fn collect(self) -> Result<Option<Bytes>, BodyError> {
        match self {
            Body::Absent => Ok(None),
            Body::Buffered(bytes) => Ok(Some(bytes)),
            Body::Streaming(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = poll_fn(|cx| stream.as_mut().poll_next(cx)).await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(Some(buf.freeze()))
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Absent => f.write_str("Body::Absent"),
            Body::Buffered(bytes) => f.debug_tuple("Body::Buffered").field(&bytes.len()).finish(),
            Body::Streaming(_) => f.write_str("Body::Streaming(..)"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Buffered(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Buffered(bytes.into())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Buffered(text.into())
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Body::Buffered(Bytes::from_static(text.as_bytes()))
    }
}

/// Maps the error half of a foreign chunk stream into [`BodyError`].
pub(crate) struct ErrIntoStream<S> {
    inner: Pin<Box<S>>,
}

impl<S, E> Stream for ErrIntoStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    type Item = Result<Bytes, BodyError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.inner
            .as_mut()
            .poll_next(cx)
            .map(|item| item.map(|chunk| chunk.map_err(|e| BodyError::Stream(e.to_string()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(parts: Vec<Result<&'static str, &'static str>>) -> Body {
        Body::from_stream(futures_util::stream::iter(
            parts
                .into_iter()
                .map(|p| p.map(|s| Bytes::from_static(s.as_bytes()))),
        ))
    }

    #[tokio::test]
    async fn absent_body_collects_to_none() {
        assert_eq!(Body::Absent.collect().await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_body_collects_to_empty_bytes() {
        let bytes = Body::empty().collect().await.unwrap().unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn buffered_body_collects_verbatim() {
        let bytes = Body::from("hello").collect().await.unwrap().unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[tokio::test]
    async fn streaming_body_concatenates_chunks_in_order() {
        let body = chunks(vec![Ok("{\"na"), Ok("me\":"), Ok("\"bob\"}")]);
        let bytes = body.collect().await.unwrap().unwrap();
        assert_eq!(&bytes[..], br#"{"name":"bob"}"#);
    }

    #[tokio::test]
    async fn streaming_error_aborts_collect() {
        let body = chunks(vec![Ok("partial"), Err("client disconnected")]);
        let err = body.collect().await.unwrap_err();
        assert_eq!(err, BodyError::stream("client disconnected"));
    }

    #[test]
    fn absent_is_distinct_from_empty() {
        assert!(Body::Absent.is_absent());
        assert!(!Body::empty().is_absent());
    }

    #[test]
    fn debug_hides_stream_internals() {
        assert_eq!(format!("{:?}", Body::from("abc")), "Body::Buffered(3)");
        assert_eq!(format!("{:?}", chunks(vec![])), "Body::Streaming(..)");
    }
}
