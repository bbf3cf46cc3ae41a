//! Composable response verification.
//!
//! A [`Verifier`] is an ordered list of independent [`Check`]s. Checks run in
//! order and the first failure is returned unchanged. The body is drained at
//! most once per response no matter how many checks look at it (see
//! [`Response::body`]).

use crate::{
    errors::VerificationError, models::response::Response,
    services::standard_headers::verify_standard_headers,
};
use bytes::Bytes;
use reqwest::{StatusCode, header::ETAG};

/// One predicate over a response.
#[derive(Clone, Debug)]
pub enum Check {
    /// Delegates to [`verify_standard_headers`].
    StandardHeaders,
    /// Status code must match exactly.
    Status(StatusCode),
    /// Body must be zero bytes long.
    EmptyBody,
    /// Body must equal these bytes exactly.
    BodyEquals(Bytes),
    /// Body must contain this text.
    BodyContains(&'static str),
    /// `ETag` (quotes stripped) must equal this value, case-insensitively.
    ETag(String),
}

impl Check {
    pub async fn apply(&self, response: &mut Response) -> Result<(), VerificationError> {
        match self {
            Check::StandardHeaders => verify_standard_headers(&response.headers),
            Check::Status(expected) => {
                if response.status != *expected {
                    return Err(VerificationError::Status {
                        expected: expected.as_u16(),
                        actual: response.status.as_u16(),
                    });
                }
                Ok(())
            }
            Check::EmptyBody => {
                let body = read_body(response).await?;
                if !body.is_empty() {
                    return Err(VerificationError::NonEmptyBody(lossy(&body)));
                }
                Ok(())
            }
            Check::BodyEquals(expected) => {
                let body = read_body(response).await?;
                if body != *expected {
                    return Err(VerificationError::BodyMismatch {
                        expected: lossy(expected),
                        expected_len: expected.len(),
                        actual: lossy(&body),
                        actual_len: body.len(),
                    });
                }
                Ok(())
            }
            Check::BodyContains(needle) => {
                let body = read_body(response).await?;
                let text = lossy(&body);
                if !text.contains(needle) {
                    return Err(VerificationError::BodyMissingContent {
                        needle: needle.to_string(),
                        body: text,
                    });
                }
                Ok(())
            }
            Check::ETag(expected) => {
                let value = response
                    .headers
                    .get(ETAG)
                    .ok_or_else(|| VerificationError::MissingHeader(ETAG.to_string()))?;
                let actual = value
                    .to_str()
                    .map_err(|err| VerificationError::InvalidHeader {
                        name: ETAG.to_string(),
                        reason: err.to_string(),
                    })?
                    .trim_matches('"');
                if !actual.eq_ignore_ascii_case(expected) {
                    return Err(VerificationError::ETagMismatch {
                        expected: expected.clone(),
                        actual: actual.to_string(),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Ordered, short-circuiting pipeline of checks.
#[derive(Clone, Debug, Default)]
pub struct Verifier {
    checks: Vec<Check>,
}

impl Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Run every check in order, stopping at the first failure.
    pub async fn verify(&self, response: &mut Response) -> Result<(), VerificationError> {
        for check in &self.checks {
            check.apply(response).await?;
        }
        Ok(())
    }

    /// Headers, status, then an empty body.
    pub fn put_object(expected: StatusCode) -> Self {
        Self::new()
            .check(Check::StandardHeaders)
            .check(Check::Status(expected))
            .check(Check::EmptyBody)
    }

    /// Headers, status, ETag of the uploaded body, then the body itself.
    pub fn get_object(expected: StatusCode, body: Bytes, etag: String) -> Self {
        Self::new()
            .check(Check::StandardHeaders)
            .check(Check::Status(expected))
            .check(Check::ETag(etag))
            .check(Check::BodyEquals(body))
    }

    pub fn copy_object(expected: StatusCode) -> Self {
        Self::new()
            .check(Check::StandardHeaders)
            .check(Check::Status(expected))
            .check(Check::BodyContains("CopyObjectResult"))
    }

    pub fn make_bucket(expected: StatusCode) -> Self {
        Self::put_object(expected)
    }

    /// Shared by object and bucket removal.
    pub fn remove(expected: StatusCode) -> Self {
        Self::put_object(expected)
    }
}

async fn read_body(response: &mut Response) -> Result<Bytes, VerificationError> {
    response
        .body()
        .await
        .cloned()
        .map_err(VerificationError::BodyRead)
}

fn lossy(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}
