//! Unified Error Model
use std::time::Duration;
use thiserror::Error;

use crate::stage::StageError;

/// A stage could not produce output; the run stopped there.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("stage '{stage_id}' (#{position}) failed: {cause}")]
pub struct StageFailure {
    pub stage_id: String,
    /// Zero-based position of the stage in the pipeline
    pub position: usize,
    /// Zero-based loop iteration the failure happened in
    pub loop_index: u32,
    #[source]
    pub cause: StageError,
}

impl StageFailure {
    pub fn is_timeout(&self) -> bool {
        matches!(self.cause, StageError::Timeout(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwarmError {
    #[error("PIPELINE/EMPTY: a pipeline needs at least one stage")]
    EmptyPipeline,

    #[error("PIPELINE/LOOPS: max_loops must be at least 1")]
    ZeroLoops,

    #[error("PIPELINE/TIMEOUT: stage '{0}' has a zero timeout")]
    ZeroTimeout(String),

    #[error("RETRY/ATTEMPTS: max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("CONFIG/{0}")]
    ConfigError(String),
}

impl SwarmError {
    pub(crate) fn check_timeout(stage_id: &str, timeout: Option<Duration>) -> Result<(), Self> {
        match timeout {
            Some(t) if t.is_zero() => Err(Self::ZeroTimeout(stage_id.to_string())),
            _ => Ok(()),
        }
    }
}
