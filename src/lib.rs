//! Compatibility checks for S3-style object storage endpoints.
//!
//! Each test step issues one storage operation, verifies the response
//! against the protocol contract and records what it created so later steps
//! (and cleanup) can build on it.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod steps;
pub mod suite;
