pub mod hasher;
pub mod payload;
pub mod registry;
pub mod reporter;
pub mod request_builder;
pub mod standard_headers;
pub mod transport;
pub mod verifier;
