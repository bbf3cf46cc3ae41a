//! Synthetic object bodies.

use bytes::Bytes;
use rand::{Rng, distributions::Alphanumeric};

/// Supplies object bodies of an exact length.
pub trait BodyGenerator: Send + Sync {
    fn generate(&self, len: usize) -> Bytes;
}

/// Random alphanumeric bodies.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomBody;

impl BodyGenerator for RandomBody {
    fn generate(&self, len: usize) -> Bytes {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .collect::<Vec<u8>>()
            .into()
    }
}
