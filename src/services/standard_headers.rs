//! Headers every storage API response is expected to carry.

use crate::errors::VerificationError;
use chrono::DateTime;
use reqwest::header::{DATE, HeaderMap, HeaderName};

pub const X_AMZ_REQUEST_ID: HeaderName = HeaderName::from_static("x-amz-request-id");

/// Check the protocol-mandated response headers.
///
/// - `Date` must be present and a valid HTTP date
/// - `x-amz-request-id` must be present and non-empty
pub fn verify_standard_headers(headers: &HeaderMap) -> Result<(), VerificationError> {
    let date = headers
        .get(DATE)
        .ok_or_else(|| VerificationError::MissingHeader(DATE.to_string()))?;
    let date = date.to_str().map_err(|err| VerificationError::InvalidHeader {
        name: DATE.to_string(),
        reason: err.to_string(),
    })?;
    DateTime::parse_from_rfc2822(date).map_err(|err| VerificationError::InvalidHeader {
        name: DATE.to_string(),
        reason: format!("{:?} is not an HTTP date: {}", date, err),
    })?;

    match headers.get(&X_AMZ_REQUEST_ID) {
        Some(value) if !value.is_empty() => Ok(()),
        _ => Err(VerificationError::MissingHeader(X_AMZ_REQUEST_ID.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn valid() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            DATE,
            HeaderValue::from_static("Sun, 06 Nov 1994 08:49:37 GMT"),
        );
        headers.insert(X_AMZ_REQUEST_ID, HeaderValue::from_static("17A2B3C4D5E6F708"));
        headers
    }

    #[test]
    fn accepts_standard_headers() {
        assert!(verify_standard_headers(&valid()).is_ok());
    }

    #[test]
    fn missing_date_is_reported() {
        let mut headers = valid();
        headers.remove(DATE);
        let err = verify_standard_headers(&headers).unwrap_err();
        assert!(matches!(err, VerificationError::MissingHeader(name) if name == "date"));
    }

    #[test]
    fn malformed_date_is_reported() {
        let mut headers = valid();
        headers.insert(DATE, HeaderValue::from_static("yesterday"));
        let err = verify_standard_headers(&headers).unwrap_err();
        assert!(matches!(err, VerificationError::InvalidHeader { .. }));
    }

    #[test]
    fn missing_request_id_is_reported() {
        let mut headers = valid();
        headers.remove(X_AMZ_REQUEST_ID);
        let err = verify_standard_headers(&headers).unwrap_err();
        assert!(err.to_string().contains("x-amz-request-id"));
    }
}
