//! Binary entrypoint for the Swarm API server.
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use swarm_api::{run, AppState};
use swarm_stages::{
    environmental_monitoring_pipeline, generator_pipeline, ChatCompletionsClient, LlmConfig,
    DEFAULT_STAGE_TIMEOUT_SECS,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Default listen address can be overridden with SWARM_ADDR
    let addr = std::env::var("SWARM_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());

    // With an API key the chat runs the LLM chain, otherwise the offline monitoring chain.
    let mut llm = LlmConfig::default();
    llm.apply_env(|key| std::env::var(key).ok());
    let pipeline = if llm.has_api_key() {
        let timeout = Duration::from_secs(DEFAULT_STAGE_TIMEOUT_SECS);
        generator_pipeline(Arc::new(ChatCompletionsClient::new(llm)?), Some(timeout))?
    } else {
        environmental_monitoring_pipeline()?
    };
    tracing::info!(pipeline = pipeline.pipeline_id(), "pipeline ready");

    let state = AppState::new(pipeline)?;
    let runtime = tokio::runtime::Runtime::new().context("starting runtime")?;
    runtime.block_on(run(&addr, state)).context("serving API")?;
    Ok(())
}
