//! Represents a bucket the run created or was told about.

use uuid::Uuid;

/// A bucket known to the current run.
///
/// Buckets act as namespaces for the objects a run uploads. The descriptor
/// only carries the name; everything else is owned by the server under test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketDescriptor {
    /// Bucket name as sent on the wire (DNS-compatible).
    pub name: String,
}

impl BucketDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Generate a fresh bucket name unlikely to collide with existing ones.
    pub fn generated() -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self::new(format!("s3verify-{}", &id[..8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_dns_compatible() {
        let bucket = BucketDescriptor::generated();
        assert!(bucket.name.starts_with("s3verify-"));
        assert_eq!(bucket.name.len(), "s3verify-".len() + 8);
        assert!(
            bucket
                .name
                .chars()
                .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'))
        );
        assert_ne!(bucket, BucketDescriptor::generated());
    }
}
