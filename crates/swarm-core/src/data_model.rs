//! Data Model: RunOutput, StageTrace
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one pipeline invocation.
pub type RunResult = Result<RunOutput, crate::error::StageFailure>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Text returned by the last stage
    pub output: String,
    pub trace_id: String,
    pub pipeline_id: String,
    pub started_at: DateTime<Utc>,
    /// One entry per stage call, in execution order
    pub traces: Vec<StageTrace>,
}

impl RunOutput {
    pub fn total_latency_ms(&self) -> u64 {
        self.traces.iter().map(|t| t.latency_ms).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTrace {
    pub id: String,
    pub position: usize,
    pub loop_index: u32,
    pub in_hash: String,
    pub out_hash: String,
    pub deterministic: bool,
    pub latency_ms: u64,
}
