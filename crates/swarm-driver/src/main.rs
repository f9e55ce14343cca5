//! Binary entrypoint: generate swarm programs with the LLM chain.
//!
//! Usage: `swarm-generate [config.yaml]`
use anyhow::{bail, Context};
use std::path::PathBuf;
use std::sync::Arc;
use swarm_driver::{DriverConfig, FileSink, Generator};
use swarm_stages::{generator_pipeline, ChatCompletionsClient};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = DriverConfig::load(config_path.as_deref()).context("loading configuration")?;
    config.require_api_key()?;

    // Blocking HTTP client: built outside the async runtime.
    let client = ChatCompletionsClient::new(config.llm.clone())?;
    let pipeline = generator_pipeline(Arc::new(client), config.stage_timeout())?;
    let generator = Generator::from_config(pipeline, FileSink::new(&config.output_dir), &config);

    let runtime = tokio::runtime::Runtime::new().context("starting runtime")?;
    let summary = runtime.block_on(generator.run())?;

    tracing::info!(
        written = summary.succeeded(),
        failed = summary.failures.len(),
        attempts = summary.attempts,
        "generation finished"
    );

    if summary.written.is_empty() {
        bail!("no program was generated");
    }
    Ok(())
}
