//! Generation loop: run the chain, persist the program, repeat a bounded
//! number of times.
use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::sink::{generated_file_name, OutputSink};
use chrono::Local;
use std::path::PathBuf;
use swarm_core::{PipelineRunner, RetryPolicy, StageFailure};
use tracing::{error, info};

/// What a [`Generator::run`] produced.
#[derive(Debug, Default)]
pub struct GenerationSummary {
    pub written: Vec<PathBuf>,
    /// Final failure of every run whose retries were exhausted
    pub failures: Vec<StageFailure>,
    /// Pipeline invocations across all runs
    pub attempts: u32,
}

impl GenerationSummary {
    pub fn succeeded(&self) -> usize {
        self.written.len()
    }
}

pub struct Generator<S> {
    pipeline: PipelineRunner,
    sink: S,
    retry: RetryPolicy,
    runs: u32,
    stop_on_failure: bool,
    seed_prompt: String,
}

impl<S: OutputSink> Generator<S> {
    pub fn new(pipeline: PipelineRunner, sink: S, seed_prompt: impl Into<String>) -> Self {
        Self {
            pipeline,
            sink,
            retry: RetryPolicy::once(),
            runs: 1,
            stop_on_failure: false,
            seed_prompt: seed_prompt.into(),
        }
    }

    pub fn from_config(pipeline: PipelineRunner, sink: S, config: &DriverConfig) -> Self {
        Self::new(pipeline, sink, config.seed_prompt.clone())
            .retry(config.retry.clone())
            .runs(config.runs)
            .stop_on_failure(config.stop_on_failure)
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn runs(mut self, runs: u32) -> Self {
        self.runs = runs;
        self
    }

    pub fn stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Runs the chain `runs` times. Each successful run writes exactly one
    /// file; a run that still fails after its retries is recorded and, unless
    /// `stop_on_failure` is set, the next run starts.
    ///
    /// Sink errors abort the loop.
    pub async fn run(&self) -> Result<GenerationSummary, DriverError> {
        self.retry.validate()?;
        let mut summary = GenerationSummary::default();

        for run in 1..=self.runs {
            info!(run, runs = self.runs, pipeline = self.pipeline.pipeline_id(), "generation run started");

            let outcome = self.retry.run(&self.pipeline, &self.seed_prompt).await;
            summary.attempts += outcome.attempts;

            match outcome.result {
                Ok(output) => {
                    let file_name = generated_file_name(&Local::now());
                    let path = self.sink.write(&file_name, &output.output)?;
                    info!(run, path = %path.display(), latency_ms = output.total_latency_ms(), "generation run finished");
                    summary.written.push(path);
                }
                Err(failure) => {
                    error!(run, attempts = outcome.attempts, error = %failure, "generation run failed");
                    summary.failures.push(failure);
                    if self.stop_on_failure {
                        break;
                    }
                }
            }
        }

        Ok(summary)
    }
}
