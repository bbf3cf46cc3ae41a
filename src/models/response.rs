//! A response received from the storage endpoint.

use bytes::{Bytes, BytesMut};
use futures::{StreamExt, stream::BoxStream};
use reqwest::{StatusCode, header::HeaderMap};
use std::{fmt, io};

/// Single-read body stream handed over by the transport.
pub type ResponseBody = BoxStream<'static, io::Result<Bytes>>;

/// Status, headers and a body that may be drained only once.
///
/// The body is read lazily by [`Response::body`] and cached, so every check
/// in a verification pipeline sees the same bytes without a second read.
/// Dropping the response releases the underlying connection.
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    stream: Option<ResponseBody>,
    consumed: Option<Bytes>,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, stream: Option<ResponseBody>) -> Self {
        Self {
            status,
            headers,
            stream,
            consumed: None,
        }
    }

    /// Drain the body stream on first call; later calls return the cached bytes.
    ///
    /// A response without a body reads as empty.
    pub async fn body(&mut self) -> io::Result<&Bytes> {
        if self.consumed.is_none() {
            let mut buf = BytesMut::new();
            if let Some(mut stream) = self.stream.take() {
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
            }
            self.consumed = Some(buf.freeze());
        }
        Ok(self.consumed.get_or_insert_with(Bytes::new))
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_consumed", &self.consumed.is_some())
            .finish()
    }
}
