//! Ordered test plans for each run mode.
//!
//! ## Unprepared (default)
//! - `MakeBucket`   — fresh bucket in the ad-hoc partition
//! - `PutObject`    — `object_count` enumerated objects, fail-fast
//! - `GetObject`    — read back the first upload
//! - `CopyObject`   — server-side copy of the first upload
//! - `RemoveObject` — delete ad-hoc and copied objects (cleanup)
//! - `RemoveBucket` — delete the ad-hoc bucket (cleanup)
//!
//! ## Prepared (`--prepared-bucket`)
//! Same, against a bucket populated by an earlier `--prepare` run, uploading
//! a single extra object. The prepared bucket itself is left in place.
//!
//! ## Prepare (`--prepare`)
//! Create a bucket and fill it with `object_count` objects for later runs.

use crate::{
    models::bucket::BucketDescriptor,
    services::{registry::Partition, reporter::Reporter},
    steps::{
        RunContext, TestStep,
        bucket_steps::{MakeBucket, RemoveBucket},
        object_steps::{
            CopyObject, GetObject, PREPARED_OBJECT_KEY, PutObject, RemoveObjects,
            UNPREPARED_OBJECT_PREFIX,
        },
    },
};
use tracing::info;

/// Which plan to run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunMode {
    Unprepared,
    Prepared { bucket: String },
    Prepare,
}

/// Knobs that shape a plan.
#[derive(Clone, Debug)]
pub struct PlanOptions {
    /// Objects uploaded by the enumerated loop.
    pub object_count: usize,
    /// Append the cleanup steps.
    pub cleanup: bool,
}

/// Outcome counts of one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    pub passed: usize,
    pub failed: usize,
}

impl SuiteSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// A sequence of steps run one after another.
pub struct Suite {
    steps: Vec<TestStep>,
}

impl Suite {
    pub fn new(steps: Vec<TestStep>) -> Self {
        Self { steps }
    }

    /// Build the plan for `mode`, seeding `ctx` with any configured state.
    pub fn plan(mode: &RunMode, options: &PlanOptions, ctx: &RunContext) -> Self {
        let mut steps = Vec::new();
        match mode {
            RunMode::Unprepared => {
                steps.push(TestStep::new(MakeBucket {
                    partition: Partition::AdHoc,
                }));
                steps.push(TestStep::new(PutObject::bounded(
                    Partition::AdHoc,
                    Partition::AdHoc,
                    UNPREPARED_OBJECT_PREFIX,
                    options.object_count,
                )));
                push_read_steps(&mut steps, Partition::AdHoc);
                if options.cleanup {
                    push_remove_objects(&mut steps, Partition::AdHoc);
                    steps.push(TestStep::new(RemoveBucket {
                        partition: Partition::AdHoc,
                    }));
                }
            }
            RunMode::Prepared { bucket } => {
                ctx.buckets
                    .append(Partition::Prepared, BucketDescriptor::new(bucket.clone()));
                steps.push(TestStep::new(PutObject::single(
                    Partition::Prepared,
                    Partition::AdHoc,
                    PREPARED_OBJECT_KEY,
                )));
                push_read_steps(&mut steps, Partition::Prepared);
                if options.cleanup {
                    push_remove_objects(&mut steps, Partition::Prepared);
                }
            }
            RunMode::Prepare => {
                steps.push(TestStep::new(MakeBucket {
                    partition: Partition::Prepared,
                }));
                steps.push(TestStep::new(PutObject::bounded(
                    Partition::Prepared,
                    Partition::Prepared,
                    UNPREPARED_OBJECT_PREFIX,
                    options.object_count,
                )));
            }
        }
        Self::new(steps)
    }

    pub fn steps(&self) -> &[TestStep] {
        &self.steps
    }

    /// Run every step in order. A failed step is reported and the run moves
    /// on; steps depending on it then fail on their own.
    pub async fn run(&mut self, ctx: &RunContext, reporter: &dyn Reporter) -> SuiteSummary {
        let total = self.steps.len();
        let mut summary = SuiteSummary::default();
        for (index, step) in self.steps.iter_mut().enumerate() {
            if step.run(ctx, reporter, index + 1, total).await {
                summary.passed += 1;
            } else {
                summary.failed += 1;
            }
        }
        info!(
            "{} of {} tests passed",
            summary.passed,
            summary.passed + summary.failed
        );
        summary
    }
}

/// Read-back steps share the bucket partition; their objects are the ones
/// this run uploaded.
fn push_read_steps(steps: &mut Vec<TestStep>, bucket_partition: Partition) {
    steps.push(TestStep::new(GetObject {
        bucket_partition,
        object_partition: Partition::AdHoc,
    }));
    steps.push(TestStep::new(CopyObject {
        bucket_partition,
        object_partition: Partition::AdHoc,
    }));
}

fn push_remove_objects(steps: &mut Vec<TestStep>, bucket_partition: Partition) {
    steps.push(TestStep::new(RemoveObjects {
        bucket_partition,
        object_partitions: vec![Partition::AdHoc, Partition::Copied],
    }));
}
