use anyhow::Result;
use s3_verify::{
    config::AppConfig,
    services::{
        registry::Partition, reporter::ConsoleReporter, transport::HttpTransport,
    },
    steps::RunContext,
    suite::{PlanOptions, RunMode, Suite},
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // --- Parse config + run mode ---
    let (cfg, mode) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting s3-verify with config: {:?}", cfg);

    // --- Initialize transport and run state ---
    let transport = HttpTransport::new(cfg.endpoint.clone(), cfg.timeout)?;
    let ctx = RunContext::new(Arc::new(transport))
        .with_region(cfg.region.clone())
        .with_object_size(cfg.object_size);

    let options = PlanOptions {
        object_count: cfg.object_count,
        cleanup: cfg.cleanup,
    };
    let mut suite = Suite::plan(&mode, &options, &ctx);
    tracing::debug!("Planned {} tests in {:?} mode", suite.steps().len(), mode);

    // --- Run ---
    let summary = suite.run(&ctx, &ConsoleReporter).await;

    if mode == RunMode::Prepare {
        if let Ok(bucket) = ctx.buckets.first(Partition::Prepared) {
            println!("Prepared bucket: {}", bucket.name);
            println!("Re-run with --prepared-bucket {}", bucket.name);
        }
    }

    if !summary.is_success() {
        anyhow::bail!(
            "{} of {} tests failed",
            summary.failed,
            summary.passed + summary.failed
        );
    }
    Ok(())
}
