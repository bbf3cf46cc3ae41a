//! Test steps: one storage operation each, run against the endpoint under test.
//!
//! A step builds its request(s), executes them through the run's transport,
//! verifies every response and only then records what it created in the
//! run's registries. The first failure ends the step.

pub mod bucket_steps;
pub mod object_steps;

#[cfg(test)]
pub(crate) mod testing;

use crate::{
    errors::HarnessResult,
    models::{bucket::BucketDescriptor, object::ObjectDescriptor, request::Request},
    services::{
        payload::{BodyGenerator, RandomBody},
        registry::Registry,
        reporter::Reporter,
        request_builder::DEFAULT_REGION,
        transport::Transport,
        verifier::Verifier,
    },
};
use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use tracing::debug;

/// Default body length for synthetic objects.
pub const DEFAULT_OBJECT_SIZE: usize = 60;

/// Lifecycle of a [`TestStep`]. `Passed` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Executing,
    Passed,
    Failed,
}

/// How many objects an upload step synthesizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectCountPolicy {
    /// Exactly one object, key used verbatim.
    Single,
    /// `n` objects keyed `{key}{i}` for `i in 0..n`, stopping at the first failure.
    BoundedLoop(usize),
}

impl ObjectCountPolicy {
    pub fn count(&self) -> usize {
        match self {
            ObjectCountPolicy::Single => 1,
            ObjectCountPolicy::BoundedLoop(n) => *n,
        }
    }

    /// Keys in upload order.
    pub fn keys(self, base: &str) -> impl Iterator<Item = String> + '_ {
        (0..self.count()).map(move |i| match self {
            ObjectCountPolicy::Single => base.to_string(),
            ObjectCountPolicy::BoundedLoop(_) => format!("{}{}", base, i),
        })
    }
}

/// Everything shared by the steps of one run.
///
/// The registries live here rather than in globals; a step only sees what
/// earlier steps of the same run recorded.
pub struct RunContext {
    pub transport: Arc<dyn Transport>,
    pub generator: Arc<dyn BodyGenerator>,
    pub buckets: Registry<BucketDescriptor>,
    pub objects: Registry<ObjectDescriptor>,
    pub region: String,
    pub object_size: usize,
}

impl RunContext {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            generator: Arc::new(RandomBody),
            buckets: Registry::new("bucket"),
            objects: Registry::new("object"),
            region: DEFAULT_REGION.to_string(),
            object_size: DEFAULT_OBJECT_SIZE,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn BodyGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_object_size(mut self, object_size: usize) -> Self {
        self.object_size = object_size;
        self
    }

    /// Execute `request` and run `verifier` over the response.
    ///
    /// The response is dropped (and its connection released) before
    /// returning, on success and failure alike.
    pub async fn exchange(
        &self,
        method: Method,
        request: Request,
        verifier: &Verifier,
    ) -> HarnessResult<()> {
        let path = request.resource_path();
        let mut response = self.transport.execute(method.clone(), request).await?;
        debug!("{} {} -> {}", method, path, response.status);
        verifier.verify(&mut response).await?;
        Ok(())
    }
}

/// The work a single step performs.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Name shown in the report line.
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: &RunContext) -> HarnessResult<()>;
}

/// One reportable test case wrapping an [`Operation`].
pub struct TestStep {
    operation: Box<dyn Operation>,
    state: StepState,
}

impl TestStep {
    pub fn new(operation: impl Operation + 'static) -> Self {
        Self {
            operation: Box::new(operation),
            state: StepState::Pending,
        }
    }

    pub fn name(&self) -> &'static str {
        self.operation.name()
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    /// Run the operation once and report the outcome as `[current/total]`.
    ///
    /// Returns whether the step passed. A step that already finished is not
    /// run again; its earlier verdict is returned.
    pub async fn run(
        &mut self,
        ctx: &RunContext,
        reporter: &dyn Reporter,
        current: usize,
        total: usize,
    ) -> bool {
        match self.state {
            StepState::Passed => return true,
            StepState::Failed => return false,
            StepState::Pending | StepState::Executing => {}
        }

        let message = format!("[{:02}/{}] {}:", current, total, self.name());
        self.state = StepState::Executing;
        debug!("{} executing", message);

        match self.operation.run(ctx).await {
            Ok(()) => {
                self.state = StepState::Passed;
                reporter.report(&message, None);
                true
            }
            Err(err) => {
                self.state = StepState::Failed;
                reporter.report(&message, Some(&err));
                false
            }
        }
    }
}
