//! Construction of protocol-correct requests for each storage operation.
//!
//! Every request goes through [`RequestBuilder::build`], which hashes the
//! payload once and attaches the resulting `Content-MD5` and
//! `X-Amz-Content-Sha256` headers, so declared length, digests and body can
//! never drift apart.

use crate::{
    errors::{HarnessError, HarnessResult},
    models::request::{Request, has_dot_segment},
    services::hasher::compute_hash,
};
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::io::Cursor;

/// Fixed client identification sent with every request.
pub const APP_USER_AGENT: &str = concat!("s3-verify/", env!("CARGO_PKG_VERSION"));

pub const CONTENT_MD5: HeaderName = HeaderName::from_static("content-md5");
pub const X_AMZ_CONTENT_SHA256: HeaderName = HeaderName::from_static("x-amz-content-sha256");
pub const X_AMZ_COPY_SOURCE: HeaderName = HeaderName::from_static("x-amz-copy-source");

/// Unreserved characters plus `/`, which separates key segments.
const COPY_SOURCE_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Region that takes no `CreateBucketConfiguration` body.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Builder for a single [`Request`].
#[derive(Debug, Default)]
pub struct RequestBuilder {
    bucket: String,
    object: Option<String>,
    headers: HeaderMap,
    payload: Bytes,
}

impl RequestBuilder {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    pub fn object(mut self, key: impl Into<String>) -> Self {
        self.object = Some(key.into());
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Validate identifiers, hash the payload and assemble the request.
    ///
    /// Returns nothing partial: any failure leaves no request behind.
    pub async fn build(self) -> HarnessResult<Request> {
        if self.bucket.is_empty() {
            return Err(HarnessError::EmptyName("bucket"));
        }
        if let Some(object) = &self.object {
            if object.is_empty() {
                return Err(HarnessError::EmptyName("object"));
            }
            if has_dot_segment(object) {
                return Err(HarnessError::DotSegment(object.clone()));
            }
        }

        let mut body = Cursor::new(self.payload);
        let hash = compute_hash(&mut body)
            .await
            .map_err(HarnessError::Payload)?;

        let mut headers = self.headers;
        headers.insert(
            CONTENT_MD5,
            HeaderValue::from_str(&general_purpose::STANDARD.encode(hash.md5))?,
        );
        headers.insert(
            X_AMZ_CONTENT_SHA256,
            HeaderValue::from_str(&hex::encode(hash.sha256))?,
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(APP_USER_AGENT));

        Ok(Request {
            bucket_name: self.bucket,
            object_name: self.object,
            headers,
            content_length: hash.length,
            body,
        })
    }
}

/// PUT object: upload `data` as `bucket/object`.
pub async fn new_put_object_request(
    bucket: &str,
    object: &str,
    data: impl Into<Bytes>,
) -> HarnessResult<Request> {
    RequestBuilder::new(bucket)
        .object(object)
        .payload(data)
        .build()
        .await
}

/// GET object.
pub async fn new_get_object_request(bucket: &str, object: &str) -> HarnessResult<Request> {
    RequestBuilder::new(bucket).object(object).build().await
}

/// PUT object with `X-Amz-Copy-Source` pointing at an existing object.
pub async fn new_copy_object_request(
    bucket: &str,
    object: &str,
    source_bucket: &str,
    source_object: &str,
) -> HarnessResult<Request> {
    if source_bucket.is_empty() {
        return Err(HarnessError::EmptyName("source bucket"));
    }
    if source_object.is_empty() {
        return Err(HarnessError::EmptyName("source object"));
    }
    let source = format!("/{}/{}", source_bucket, source_object);
    let source = utf8_percent_encode(&source, COPY_SOURCE_ENCODE).to_string();
    let source = HeaderValue::from_str(&source)?;
    RequestBuilder::new(bucket)
        .object(object)
        .header(X_AMZ_COPY_SOURCE, source)
        .build()
        .await
}

/// DELETE object.
pub async fn new_remove_object_request(bucket: &str, object: &str) -> HarnessResult<Request> {
    RequestBuilder::new(bucket).object(object).build().await
}

/// PUT bucket, with a location constraint outside the default region.
pub async fn new_make_bucket_request(bucket: &str, region: &str) -> HarnessResult<Request> {
    let builder = RequestBuilder::new(bucket);
    let builder = if region.is_empty() || region.eq_ignore_ascii_case(DEFAULT_REGION) {
        builder
    } else {
        builder.payload(create_bucket_configuration(region))
    };
    builder.build().await
}

/// DELETE bucket.
pub async fn new_remove_bucket_request(bucket: &str) -> HarnessResult<Request> {
    RequestBuilder::new(bucket).build().await
}

fn create_bucket_configuration(region: &str) -> String {
    format!(
        concat!(
            r#"<CreateBucketConfiguration xmlns="http://s3.amazonaws.com/doc/2006-03-01/">"#,
            r#"<LocationConstraint>{}</LocationConstraint>"#,
            r#"</CreateBucketConfiguration>"#
        ),
        region
    )
}
