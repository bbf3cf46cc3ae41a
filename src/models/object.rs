//! Represents an object (key + payload) uploaded during a run.

use bytes::Bytes;

/// A single object a step uploaded.
///
/// Later steps read the body back and compare it byte for byte, so the
/// payload is kept alongside the key. Immutable once registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectDescriptor {
    /// Object key (path-like identifier within the bucket).
    pub key: String,

    /// Exact bytes that were sent as the object body.
    pub body: Bytes,
}

impl ObjectDescriptor {
    pub fn new(key: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            body: body.into(),
        }
    }

    /// ETag a server is expected to return for a single-part upload.
    pub fn expected_etag(&self) -> String {
        format!("{:x}", md5::compute(&self.body))
    }
}
