//! Pipeline Runner: chains stages strictly in order and stops at the first failure
use crate::context::ExecutionContext;
use crate::data_model::{RunOutput, RunResult, StageTrace};
use crate::error::{StageFailure, SwarmError};
use crate::stage::{Stage, StageError};
use chrono::Utc;
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

struct StageSlot {
    stage: Arc<dyn Stage>,
    timeout: Option<Duration>,
}

/// Ordered, immutable sequence of stages.
///
/// ```
/// use swarm_core::{FnStage, PipelineRunner};
///
/// # tokio_test_block(async {
/// let pipeline = PipelineRunner::builder()
///     .stage(FnStage::new("double", |x| Ok((x.parse::<i64>().unwrap() * 2).to_string())))
///     .stage(FnStage::new("increment", |x| Ok((x.parse::<i64>().unwrap() + 1).to_string())))
///     .build()
///     .unwrap();
///
/// let out = pipeline.run("3").await.unwrap();
/// assert_eq!(out.output, "7");
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
pub struct PipelineRunner {
    slots: Vec<StageSlot>,
    max_loops: u32,
    pipeline_id: String,
}

impl PipelineRunner {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Result<Self, SwarmError> {
        stages
            .into_iter()
            .fold(Self::builder(), |builder, stage| builder.boxed_stage(stage))
            .build()
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Runs the pipeline with a fresh execution context.
    pub async fn run(&self, input: &str) -> RunResult {
        self.run_with_context(input, &ExecutionContext::new()).await
    }

    pub async fn run_with_context(&self, input: &str, ctx: &ExecutionContext) -> RunResult {
        let started_at = Utc::now();
        let mut current = input.to_string();
        let mut traces = Vec::with_capacity(self.slots.len());

        info!(
            trace_id = %ctx.trace_id,
            pipeline = %self.pipeline_id,
            max_loops = self.max_loops,
            "pipeline started"
        );

        for loop_index in 0..self.max_loops {
            for (position, slot) in self.slots.iter().enumerate() {
                let stage_id = slot.stage.id();
                let start = Instant::now();
                let in_hash = hash_text(&current);

                debug!(trace_id = %ctx.trace_id, stage = stage_id, position, loop_index, "stage started");

                let result = match call_stage(slot, std::mem::take(&mut current), ctx).await {
                    Ok(result) => result,
                    Err(cause) => {
                        warn!(
                            trace_id = %ctx.trace_id,
                            stage = stage_id,
                            position,
                            loop_index,
                            error = %cause,
                            "stage failed, halting pipeline"
                        );
                        return Err(StageFailure {
                            stage_id: stage_id.to_string(),
                            position,
                            loop_index,
                            cause,
                        });
                    }
                };

                let latency_ms = start.elapsed().as_millis() as u64;
                debug!(trace_id = %ctx.trace_id, stage = stage_id, latency_ms, "stage finished");

                traces.push(StageTrace {
                    id: stage_id.to_string(),
                    position,
                    loop_index,
                    in_hash,
                    out_hash: hash_text(&result),
                    deterministic: slot.stage.deterministic(),
                    latency_ms,
                });

                current = result;
            }
        }

        info!(trace_id = %ctx.trace_id, pipeline = %self.pipeline_id, stages = traces.len(), "pipeline finished");

        Ok(RunOutput {
            output: current,
            trace_id: ctx.trace_id.clone(),
            pipeline_id: self.pipeline_id.clone(),
            started_at,
            traces,
        })
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn stage_ids(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.stage.id()).collect()
    }

    pub fn max_loops(&self) -> u32 {
        self.max_loops
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false for a built pipeline.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Builder for [`PipelineRunner`]; validates on `build`.
pub struct PipelineBuilder {
    slots: Vec<StageSlot>,
    max_loops: u32,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            max_loops: 1,
        }
    }
}

impl PipelineBuilder {
    pub fn stage<S: Stage + 'static>(self, stage: S) -> Self {
        self.shared_stage(Arc::new(stage), None)
    }

    pub fn stage_with_timeout<S: Stage + 'static>(self, stage: S, timeout: Duration) -> Self {
        self.shared_stage(Arc::new(stage), Some(timeout))
    }

    pub fn boxed_stage(self, stage: Box<dyn Stage>) -> Self {
        self.shared_stage(Arc::from(stage), None)
    }

    pub fn shared_stage(mut self, stage: Arc<dyn Stage>, timeout: Option<Duration>) -> Self {
        self.slots.push(StageSlot { stage, timeout });
        self
    }

    pub fn max_loops(mut self, max_loops: u32) -> Self {
        self.max_loops = max_loops;
        self
    }

    pub fn build(self) -> Result<PipelineRunner, SwarmError> {
        if self.slots.is_empty() {
            return Err(SwarmError::EmptyPipeline);
        }
        if self.max_loops == 0 {
            return Err(SwarmError::ZeroLoops);
        }
        for slot in &self.slots {
            SwarmError::check_timeout(slot.stage.id(), slot.timeout)?;
        }

        let pipeline_id = self
            .slots
            .iter()
            .map(|s| s.stage.id())
            .collect::<Vec<_>>()
            .join("→");

        Ok(PipelineRunner {
            slots: self.slots,
            max_loops: self.max_loops,
            pipeline_id,
        })
    }
}

/// Runs one stage on the blocking pool, bounded by the slot's timeout.
/// A timed-out call keeps running detached; its result is dropped.
async fn call_stage(
    slot: &StageSlot,
    input: String,
    ctx: &ExecutionContext,
) -> Result<String, StageError> {
    let stage = Arc::clone(&slot.stage);
    let ctx = ctx.clone();
    let handle = tokio::task::spawn_blocking(move || stage.run(&input, &ctx));

    let joined = match slot.timeout {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => return Err(StageError::Timeout(limit)),
        },
        None => handle.await,
    };

    match joined {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(StageError::Panicked(panic_message(e.into_panic()))),
        Err(e) => Err(StageError::Panicked(e.to_string())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "stage panicked".to_string()
    }
}

fn hash_text(data: &str) -> String {
    format!("blake3:{}", blake3::hash(data.as_bytes()))
}
