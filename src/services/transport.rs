//! Executes built requests against the storage endpoint.

use crate::{
    errors::{HarnessError, HarnessResult},
    models::{
        request::{Request, has_dot_segment},
        response::Response,
    },
};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{
    Body, Client, Method, Url,
    header::{CONTENT_LENGTH, HeaderMap, HeaderValue},
};
use std::{io, sync::Arc, time::Duration};
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Sends one request and hands back the response, body unread.
///
/// The caller owns the returned [`Response`]; dropping it releases the
/// connection, whichever path the caller leaves by.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, method: Method, request: Request) -> HarnessResult<Response>;
}

/// Adds authentication to an outgoing request.
///
/// Applied after the payload headers are in place and before sending, so it
/// can cover `X-Amz-Content-Sha256` and friends.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, method: &Method, url: &Url, headers: &mut HeaderMap) -> HarnessResult<()>;
}

/// Path-style HTTP transport backed by `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    signer: Option<Arc<dyn RequestSigner>>,
}

impl HttpTransport {
    /// `timeout` bounds each whole exchange; `None` waits indefinitely.
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> HarnessResult<Self> {
        if endpoint.cannot_be_a_base() {
            return Err(HarnessError::InvalidUrl(endpoint.to_string()));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint,
            signer: None,
        })
    }

    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// `{endpoint}/{bucket}[/{key segments}]`; `/` inside a key stays a separator.
    pub fn url_for(&self, request: &Request) -> HarnessResult<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| HarnessError::InvalidUrl(self.endpoint.to_string()))?;
            segments.pop_if_empty().push(&request.bucket_name);
            if let Some(object) = &request.object_name {
                if has_dot_segment(object) {
                    return Err(HarnessError::DotSegment(object.clone()));
                }
                segments.extend(object.split('/'));
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, method: Method, request: Request) -> HarnessResult<Response> {
        let url = self.url_for(&request)?;
        let mut headers = request.headers;
        headers.insert(CONTENT_LENGTH, HeaderValue::from(request.content_length));
        if let Some(signer) = &self.signer {
            signer.sign(&method, &url, &mut headers)?;
        }

        debug!(
            "{} {} ({} bytes)",
            method,
            url,
            request.content_length
        );

        let body = Body::wrap_stream(ReaderStream::new(request.body));
        let res = self
            .client
            .request(method, url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        debug!("received {} from {}", res.status(), res.url());

        let status = res.status();
        let headers = res.headers().clone();
        let stream = res
            .bytes_stream()
            .map(|chunk| chunk.map_err(|err| io::Error::new(io::ErrorKind::Other, err)))
            .boxed();

        Ok(Response::new(status, headers, Some(stream)))
    }
}
