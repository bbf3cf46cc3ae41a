//! A fully-built request for one storage operation.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use std::io::Cursor;

/// Request ready to hand to a [`Transport`](crate::services::transport::Transport).
///
/// `content_length` always equals the number of bytes left in `body`, and the
/// checksum headers were computed over those same bytes. Build one through
/// [`RequestBuilder`](crate::services::request_builder::RequestBuilder) to
/// keep that true.
#[derive(Debug)]
pub struct Request {
    pub bucket_name: String,

    /// `None` for bucket-level operations.
    pub object_name: Option<String>,

    /// Case-insensitive names; `insert` replaces earlier values.
    pub headers: HeaderMap,

    pub content_length: u64,

    /// Payload positioned at its start, consumed once by the transport.
    pub body: Cursor<Bytes>,
}

impl Request {
    /// Path of the addressed resource in path-style form (`/bucket/key`).
    pub fn resource_path(&self) -> String {
        match &self.object_name {
            Some(object) => format!("/{}/{}", self.bucket_name, object),
            None => format!("/{}", self.bucket_name),
        }
    }
}

/// True when `key` has a `.` or `..` segment, which URL resolution would
/// collapse into a different key.
pub fn has_dot_segment(key: &str) -> bool {
    key.split('/').any(|segment| matches!(segment, "." | ".."))
}
