//! Object-level steps: upload, read back, copy and remove.

use super::{ObjectCountPolicy, Operation, RunContext};
use crate::{
    errors::HarnessResult,
    models::object::ObjectDescriptor,
    services::{
        registry::Partition,
        request_builder::{
            new_copy_object_request, new_get_object_request, new_put_object_request,
            new_remove_object_request,
        },
        verifier::Verifier,
    },
};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};

/// Key used when a prepared run uploads its one extra object.
pub const PREPARED_OBJECT_KEY: &str = "s3verify/made/put/object";

/// Prefix of the enumerated keys uploaded by an unprepared run.
pub const UNPREPARED_OBJECT_PREFIX: &str = "s3verify/put/object/";

/// Upload one or more freshly generated objects into the first bucket of a
/// partition, recording each object as soon as its upload verifies.
#[derive(Clone, Debug)]
pub struct PutObject {
    pub bucket_partition: Partition,
    pub object_partition: Partition,
    pub key: String,
    pub policy: ObjectCountPolicy,
}

impl PutObject {
    pub fn single(
        bucket_partition: Partition,
        object_partition: Partition,
        key: impl Into<String>,
    ) -> Self {
        Self {
            bucket_partition,
            object_partition,
            key: key.into(),
            policy: ObjectCountPolicy::Single,
        }
    }

    pub fn bounded(
        bucket_partition: Partition,
        object_partition: Partition,
        prefix: impl Into<String>,
        count: usize,
    ) -> Self {
        Self {
            bucket_partition,
            object_partition,
            key: prefix.into(),
            policy: ObjectCountPolicy::BoundedLoop(count),
        }
    }
}

#[async_trait]
impl Operation for PutObject {
    fn name(&self) -> &'static str {
        "PutObject"
    }

    async fn run(&self, ctx: &RunContext) -> HarnessResult<()> {
        let bucket = ctx.buckets.first(self.bucket_partition)?;
        let verifier = Verifier::put_object(StatusCode::OK);

        for key in self.policy.keys(&self.key) {
            let object = ObjectDescriptor::new(key, ctx.generator.generate(ctx.object_size));
            let request =
                new_put_object_request(&bucket.name, &object.key, object.body.clone()).await?;
            ctx.exchange(Method::PUT, request, &verifier).await?;
            ctx.objects.append(self.object_partition, object);
        }
        Ok(())
    }
}

/// Download the first recorded object and compare it with what was uploaded.
#[derive(Clone, Debug)]
pub struct GetObject {
    pub bucket_partition: Partition,
    pub object_partition: Partition,
}

#[async_trait]
impl Operation for GetObject {
    fn name(&self) -> &'static str {
        "GetObject"
    }

    async fn run(&self, ctx: &RunContext) -> HarnessResult<()> {
        let bucket = ctx.buckets.first(self.bucket_partition)?;
        let object = ctx.objects.first(self.object_partition)?;
        let request = new_get_object_request(&bucket.name, &object.key).await?;
        let verifier =
            Verifier::get_object(StatusCode::OK, object.body.clone(), object.expected_etag());
        ctx.exchange(Method::GET, request, &verifier).await
    }
}

/// Server-side copy of the first recorded object to `{key}/copy`.
#[derive(Clone, Debug)]
pub struct CopyObject {
    pub bucket_partition: Partition,
    pub object_partition: Partition,
}

#[async_trait]
impl Operation for CopyObject {
    fn name(&self) -> &'static str {
        "CopyObject"
    }

    async fn run(&self, ctx: &RunContext) -> HarnessResult<()> {
        let bucket = ctx.buckets.first(self.bucket_partition)?;
        let source = ctx.objects.first(self.object_partition)?;
        let copy = ObjectDescriptor::new(format!("{}/copy", source.key), source.body.clone());

        let request =
            new_copy_object_request(&bucket.name, &copy.key, &bucket.name, &source.key).await?;
        ctx.exchange(Method::PUT, request, &Verifier::copy_object(StatusCode::OK))
            .await?;
        ctx.objects.append(Partition::Copied, copy);
        Ok(())
    }
}

/// Delete every object recorded in the given partitions.
#[derive(Clone, Debug)]
pub struct RemoveObjects {
    pub bucket_partition: Partition,
    pub object_partitions: Vec<Partition>,
}

#[async_trait]
impl Operation for RemoveObjects {
    fn name(&self) -> &'static str {
        "RemoveObject"
    }

    async fn run(&self, ctx: &RunContext) -> HarnessResult<()> {
        let bucket = ctx.buckets.first(self.bucket_partition)?;
        let verifier = Verifier::remove(StatusCode::NO_CONTENT);

        for partition in &self.object_partitions {
            for object in ctx.objects.all(*partition) {
                let request = new_remove_object_request(&bucket.name, &object.key).await?;
                ctx.exchange(Method::DELETE, request, &verifier).await?;
            }
        }
        Ok(())
    }
}
