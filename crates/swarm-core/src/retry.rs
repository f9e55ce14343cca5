//! Bounded retry of whole pipeline runs
//!
//! The runner itself never retries. Callers that want another attempt after a
//! [`StageFailure`](crate::StageFailure) re-invoke the entire pipeline through
//! a [`RetryPolicy`], which always has an exit condition.
use crate::data_model::RunResult;
use crate::error::SwarmError;
use crate::runner::PipelineRunner;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 1_000,
        }
    }
}

/// Final result of a retried run and how many attempts it took.
#[derive(Debug)]
pub struct RetryOutcome {
    pub result: RunResult,
    pub attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Result<Self, SwarmError> {
        let policy = Self {
            max_attempts,
            backoff_ms: backoff.as_millis() as u64,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Single attempt, no retry.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 0,
        }
    }

    pub fn validate(&self) -> Result<(), SwarmError> {
        if self.max_attempts == 0 {
            return Err(SwarmError::ZeroAttempts);
        }
        Ok(())
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    /// Runs `pipeline` until it succeeds or `max_attempts` is reached.
    /// The last failure is returned when every attempt fails.
    pub async fn run(&self, pipeline: &PipelineRunner, input: &str) -> RetryOutcome {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let result = pipeline.run(input).await;
            match &result {
                Ok(_) => {
                    if attempt > 1 {
                        info!(pipeline = pipeline.pipeline_id(), attempt, "pipeline succeeded after retry");
                    }
                    return RetryOutcome { result, attempts: attempt };
                }
                Err(failure) if attempt < max_attempts => {
                    warn!(
                        pipeline = pipeline.pipeline_id(),
                        attempt,
                        max_attempts,
                        error = %failure,
                        "pipeline attempt failed, retrying"
                    );
                    if self.backoff_ms > 0 {
                        tokio::time::sleep(self.backoff()).await;
                    }
                    attempt += 1;
                }
                Err(failure) => {
                    warn!(pipeline = pipeline.pipeline_id(), attempt, error = %failure, "retries exhausted");
                    return RetryOutcome { result, attempts: attempt };
                }
            }
        }
    }
}
