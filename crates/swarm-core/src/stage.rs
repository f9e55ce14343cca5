//! Stage Trait: the single contract every pipeline stage implements
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::context::ExecutionContext;

/// One unit of sequential text transformation.
pub trait Stage: Send + Sync {
    /// Stage identifier (ex: "organizational-designer")
    fn id(&self) -> &str;

    /// Whether the stage yields the same output for the same input (default: true)
    fn deterministic(&self) -> bool {
        true
    }

    /// Executes the stage
    fn run(&self, input: &str, ctx: &ExecutionContext) -> Result<String, StageError>;
}

/// Why a stage could not produce output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("STAGE/EXEC: {0}")]
    ExecutionFailed(String),

    #[error("STAGE/INPUT: {0}")]
    InvalidInput(String),

    #[error("STAGE/TIMEOUT: no output after {0:?}")]
    Timeout(Duration),

    #[error("STAGE/PANIC: {0}")]
    Panicked(String),
}

impl StageError {
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

type StageFn = dyn Fn(&str) -> Result<String, StageError> + Send + Sync;

/// A stage built from a label and a function.
///
/// ```
/// use swarm_core::{FnStage, Stage, ExecutionContext};
///
/// let shout = FnStage::new("shout", |input| Ok(input.to_uppercase()));
/// let ctx = ExecutionContext::new();
/// assert_eq!(shout.run("hi", &ctx).unwrap(), "HI");
/// ```
#[derive(Clone)]
pub struct FnStage {
    id: String,
    deterministic: bool,
    func: Arc<StageFn>,
}

impl FnStage {
    pub fn new<F>(id: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Result<String, StageError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            deterministic: true,
            func: Arc::new(func),
        }
    }

    /// Marks the stage as non-deterministic (ex: sampled LLM output)
    pub fn nondeterministic(mut self) -> Self {
        self.deterministic = false;
        self
    }
}

impl Stage for FnStage {
    fn id(&self) -> &str {
        &self.id
    }

    fn deterministic(&self) -> bool {
        self.deterministic
    }

    fn run(&self, input: &str, _ctx: &ExecutionContext) -> Result<String, StageError> {
        (self.func)(input)
    }
}

impl fmt::Debug for FnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStage")
            .field("id", &self.id)
            .field("deterministic", &self.deterministic)
            .finish_non_exhaustive()
    }
}
