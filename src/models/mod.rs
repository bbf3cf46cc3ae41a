//! Data carried between the request builder, the transport and the verifier.
//!
//! Descriptors are what the registry records about buckets and objects a run
//! created. `Request` and `Response` are the two halves of a single exchange
//! with the storage endpoint under test.

pub mod bucket;
pub mod object;
pub mod request;
pub mod response;
