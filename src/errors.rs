use crate::services::registry::Partition;
use reqwest::header::InvalidHeaderValue;
use std::{fmt, io};
use thiserror::Error;

/// Coarse classification of a failure, used when reporting a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Payload unreadable or identifiers malformed while building a request.
    Construction,
    /// The request never produced a response.
    Transport,
    /// The response broke the protocol contract.
    Verification,
    /// A step needed state that no earlier step recorded.
    Registry,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Construction => "construction",
            ErrorKind::Transport => "transport",
            ErrorKind::Verification => "verification",
            ErrorKind::Registry => "registry",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),
    #[error("object key `{0}` contains a `.` or `..` path segment")]
    DotSegment(String),
    #[error("unable to read request payload: {0}")]
    Payload(#[source] io::Error),
    #[error(transparent)]
    InvalidHeaderValue(#[from] InvalidHeaderValue),
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error("no {kind} recorded in the {partition} partition")]
    RegistryEmpty {
        kind: &'static str,
        partition: Partition,
    },
}

impl HarnessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HarnessError::EmptyName(_)
            | HarnessError::DotSegment(_)
            | HarnessError::Payload(_)
            | HarnessError::InvalidHeaderValue(_)
            | HarnessError::InvalidUrl(_) => ErrorKind::Construction,
            HarnessError::Http(_) | HarnessError::Transport(_) => ErrorKind::Transport,
            HarnessError::Verification(_) => ErrorKind::Verification,
            HarnessError::RegistryEmpty { .. } => ErrorKind::Registry,
        }
    }

    /// Shortcut for a transport failure raised outside of reqwest.
    pub fn transport(msg: impl Into<String>) -> Self {
        HarnessError::Transport(msg.into())
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;

/// A response that does not match what the storage API promises.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Unexpected Response Status Code: wanted {expected}, got {actual}")]
    Status { expected: u16, actual: u16 },
    #[error("Missing header: {0}")]
    MissingHeader(String),
    #[error("Invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("Unexpected Body Received: expected empty body but received: {0}")]
    NonEmptyBody(String),
    #[error("Unexpected Body Received: wanted {expected_len} bytes {expected:?}, got {actual_len} bytes {actual:?}")]
    BodyMismatch {
        expected: String,
        expected_len: usize,
        actual: String,
        actual_len: usize,
    },
    #[error("Unexpected Body Received: expected body to contain {needle:?} but received: {body}")]
    BodyMissingContent { needle: String, body: String },
    #[error("Unexpected ETag: wanted {expected}, got {actual}")]
    ETagMismatch { expected: String, actual: String },
    #[error("unable to read response body: {0}")]
    BodyRead(#[source] io::Error),
}
