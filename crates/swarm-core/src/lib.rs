//! Swarm Core: Stage trait, linear Runner, and Data Model
//!
//! Stages run strictly in declared order; each stage's output is the next
//! stage's input, and the first failure halts the run.
//!
//! ```text
//! input → stage[0] → stage[1] → … → stage[n-1] → output
//!            ↓ Err
//!       StageFailure { stage_id, position, cause }
//! ```

pub mod context;
pub mod data_model;
pub mod error;
pub mod retry;
pub mod runner;
pub mod stage;

pub use context::ExecutionContext;
pub use data_model::{RunOutput, RunResult, StageTrace};
pub use error::{StageFailure, SwarmError};
pub use retry::{RetryOutcome, RetryPolicy};
pub use runner::{PipelineBuilder, PipelineRunner};
pub use stage::{FnStage, Stage, StageError};

/// Engine version
pub const SWARM_VERSION: &str = env!("CARGO_PKG_VERSION");
