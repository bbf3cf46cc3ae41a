//! Bucket-level steps.

use super::{Operation, RunContext};
use crate::{
    errors::HarnessResult,
    models::bucket::BucketDescriptor,
    services::{
        registry::Partition,
        request_builder::{new_make_bucket_request, new_remove_bucket_request},
        verifier::Verifier,
    },
};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::info;

/// Create a bucket with a generated name and record it in `partition`.
#[derive(Clone, Debug)]
pub struct MakeBucket {
    pub partition: Partition,
}

#[async_trait]
impl Operation for MakeBucket {
    fn name(&self) -> &'static str {
        "MakeBucket"
    }

    async fn run(&self, ctx: &RunContext) -> HarnessResult<()> {
        let bucket = BucketDescriptor::generated();
        let request = new_make_bucket_request(&bucket.name, &ctx.region).await?;
        ctx.exchange(Method::PUT, request, &Verifier::make_bucket(StatusCode::OK))
            .await?;
        info!("created bucket {}", bucket.name);
        ctx.buckets.append(self.partition, bucket);
        Ok(())
    }
}

/// Delete the first bucket recorded in `partition`. It must already be empty.
#[derive(Clone, Debug)]
pub struct RemoveBucket {
    pub partition: Partition,
}

#[async_trait]
impl Operation for RemoveBucket {
    fn name(&self) -> &'static str {
        "RemoveBucket"
    }

    async fn run(&self, ctx: &RunContext) -> HarnessResult<()> {
        let bucket = ctx.buckets.first(self.partition)?;
        let request = new_remove_bucket_request(&bucket.name).await?;
        ctx.exchange(
            Method::DELETE,
            request,
            &Verifier::remove(StatusCode::NO_CONTENT),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::ErrorKind,
        steps::testing::{Fault, MemoryStore},
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn make_then_remove_bucket() {
        let store = Arc::new(MemoryStore::new());
        let ctx = RunContext::new(store.clone());

        MakeBucket {
            partition: Partition::AdHoc,
        }
        .run(&ctx)
        .await
        .unwrap();
        let bucket = ctx.buckets.first(Partition::AdHoc).unwrap();
        assert!(store.has_bucket(&bucket.name));

        RemoveBucket {
            partition: Partition::AdHoc,
        }
        .run(&ctx)
        .await
        .unwrap();
        assert!(!store.has_bucket(&bucket.name));
    }

    #[tokio::test]
    async fn failed_make_bucket_records_nothing() {
        let store = Arc::new(MemoryStore::new().fault_at(1, Fault::Status(StatusCode::CONFLICT)));
        let ctx = RunContext::new(store);

        let err = MakeBucket {
            partition: Partition::Prepared,
        }
        .run(&ctx)
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Verification);
        assert!(ctx.buckets.is_empty(Partition::Prepared));
    }

    #[tokio::test]
    async fn remove_without_bucket_is_a_registry_error() {
        let ctx = RunContext::new(Arc::new(MemoryStore::new()));
        let err = RemoveBucket {
            partition: Partition::AdHoc,
        }
        .run(&ctx)
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Registry);
    }
}
