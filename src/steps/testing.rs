//! In-memory stand-ins for the run's collaborators.

use crate::{
    errors::{HarnessError, HarnessResult},
    models::{request::Request, response::Response},
    services::{
        payload::BodyGenerator,
        reporter::Reporter,
        request_builder::X_AMZ_COPY_SOURCE,
        standard_headers::X_AMZ_REQUEST_ID,
        transport::Transport,
    },
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream};
use reqwest::{
    Method, StatusCode,
    header::{DATE, ETAG, HeaderMap, HeaderValue},
};
use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

/// Injected misbehaviour for a given call.
#[derive(Clone, Copy, Debug)]
pub enum Fault {
    Status(StatusCode),
    Unreachable,
}

/// Minimal path-style object store answering like a well-behaved server.
#[derive(Default)]
pub struct MemoryStore {
    buckets: Mutex<HashSet<String>>,
    objects: Mutex<HashMap<String, Bytes>>,
    calls: Mutex<Vec<(Method, String)>>,
    faults: Mutex<HashMap<usize, Fault>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Misbehave on the `call`-th request (1-based).
    pub fn fault_at(self, call: usize, fault: Fault) -> Self {
        self.faults.lock().unwrap().insert(call, fault);
        self
    }

    pub fn with_bucket(self, name: &str) -> Self {
        self.buckets.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(Method, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn object(&self, path: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(path).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn has_bucket(&self, name: &str) -> bool {
        self.buckets.lock().unwrap().contains(name)
    }
}

#[async_trait]
impl Transport for MemoryStore {
    async fn execute(&self, method: Method, request: Request) -> HarnessResult<Response> {
        let path = request.resource_path();
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((method.clone(), path.clone()));
            calls.len()
        };
        match self.faults.lock().unwrap().get(&call) {
            Some(Fault::Status(status)) => {
                return Ok(reply(*status, Bytes::from_static(b"<Error/>"), None));
            }
            Some(Fault::Unreachable) => {
                return Err(HarnessError::transport("connection refused"));
            }
            None => {}
        }

        let payload = request.body.into_inner();
        let response = match (method, request.object_name.is_some()) {
            (Method::PUT, false) => {
                self.buckets
                    .lock()
                    .unwrap()
                    .insert(request.bucket_name.clone());
                reply(StatusCode::OK, Bytes::new(), None)
            }
            (Method::DELETE, false) => {
                self.buckets.lock().unwrap().remove(&request.bucket_name);
                reply(StatusCode::NO_CONTENT, Bytes::new(), None)
            }
            _ if !self.has_bucket(&request.bucket_name) => reply(
                StatusCode::NOT_FOUND,
                Bytes::from_static(b"<Error>NoSuchBucket</Error>"),
                None,
            ),
            (Method::PUT, true) => match request.headers.get(X_AMZ_COPY_SOURCE) {
                Some(source) => {
                    let source = source.to_str().unwrap().to_string();
                    match self.object(&source) {
                        Some(body) => {
                            let etag = etag_of(&body);
                            self.objects.lock().unwrap().insert(path, body);
                            let xml = format!(
                                "<CopyObjectResult><ETag>\"{}\"</ETag></CopyObjectResult>",
                                etag
                            );
                            reply(StatusCode::OK, Bytes::from(xml), None)
                        }
                        None => reply(
                            StatusCode::NOT_FOUND,
                            Bytes::from_static(b"<Error>NoSuchKey</Error>"),
                            None,
                        ),
                    }
                }
                None => {
                    let etag = etag_of(&payload);
                    self.objects.lock().unwrap().insert(path, payload);
                    reply(StatusCode::OK, Bytes::new(), Some(etag))
                }
            },
            (Method::GET, true) => match self.object(&path) {
                Some(body) => {
                    let etag = etag_of(&body);
                    reply(StatusCode::OK, body, Some(etag))
                }
                None => reply(
                    StatusCode::NOT_FOUND,
                    Bytes::from_static(b"<Error>NoSuchKey</Error>"),
                    None,
                ),
            },
            (Method::DELETE, true) => {
                self.objects.lock().unwrap().remove(&path);
                reply(StatusCode::NO_CONTENT, Bytes::new(), None)
            }
            _ => reply(StatusCode::METHOD_NOT_ALLOWED, Bytes::new(), None),
        };
        Ok(response)
    }
}

fn etag_of(body: &Bytes) -> String {
    format!("{:x}", md5::compute(body))
}

fn reply(status: StatusCode, body: Bytes, etag: Option<String>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(DATE, HeaderValue::from_static("Sun, 06 Nov 1994 08:49:37 GMT"));
    headers.insert(X_AMZ_REQUEST_ID, HeaderValue::from_static("17E8D4B1C0A5F263"));
    if let Some(etag) = etag {
        headers.insert(ETAG, HeaderValue::from_str(&format!("\"{}\"", etag)).unwrap());
    }
    let stream = stream::iter(vec![Ok(body)]).boxed();
    Response::new(status, headers, Some(stream))
}

/// Bodies filled with one repeated byte.
pub struct FixedBody(pub u8);

impl BodyGenerator for FixedBody {
    fn generate(&self, len: usize) -> Bytes {
        Bytes::from(vec![self.0; len])
    }
}

/// Keeps every reported line for inspection.
#[derive(Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingReporter {
    pub fn lines(&self) -> Vec<(String, Option<String>)> {
        self.lines.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, message: &str, err: Option<&HarnessError>) {
        self.lines
            .lock()
            .unwrap()
            .push((message.to_string(), err.map(ToString::to_string)));
    }
}
