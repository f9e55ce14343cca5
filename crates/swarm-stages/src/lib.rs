//! Swarm Stages: reference agents and preset chains for the pipeline runner.
//!
//! Every agent is a plain stage value (a label plus a function); there is no
//! agent hierarchy to extend.
//!
//! # Chains
//!
//! ```text
//! generator:   seed → Organizational Designer → Swarm Code Generator → program
//! monitoring:  input → Agent <loc 1> → Agent <loc 2> → Agent <loc 3> → report
//! ```

mod llm;
mod prediction;
pub mod prompts;

pub use llm::{
    ChatCompletionsClient, GenerationError, LlmConfig, LlmStage, TextGenerator, API_KEY_VAR,
    BASE_URL_VAR, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_STAGE_TIMEOUT_SECS, MODEL_VAR,
};
pub use prediction::PredictionStage;

use std::sync::Arc;
use std::time::Duration;
use swarm_core::{PipelineRunner, Stage, SwarmError};

// ============================================================================
// CONVENIENCE BUILDERS
// ============================================================================

/// Organizational Designer → Swarm Code Generator over one text generator.
///
/// `stage_timeout` bounds each LLM call; `None` waits indefinitely.
pub fn generator_pipeline(
    generator: Arc<dyn TextGenerator>,
    stage_timeout: Option<Duration>,
) -> Result<PipelineRunner, SwarmError> {
    let designer = LlmStage::new(
        prompts::ORGANIZATIONAL_DESIGNER_ID,
        prompts::ORGANIZATIONAL_DESIGNER_PROMPT,
        generator.clone(),
    );
    let coder = LlmStage::new(
        prompts::SWARM_CODE_GENERATOR_ID,
        prompts::SWARM_CODE_GENERATOR_PROMPT,
        generator,
    );

    PipelineRunner::builder()
        .shared_stage(Arc::new(designer), stage_timeout)
        .shared_stage(Arc::new(coder), stage_timeout)
        .build()
}

/// One prediction agent per location, chained in the given order.
pub fn monitoring_pipeline(label: &str, locations: &[&str]) -> Result<PipelineRunner, SwarmError> {
    PipelineRunner::new(monitoring_stages(label, locations))
}

/// Environmental monitoring system: three locations.
pub fn environmental_monitoring_pipeline() -> Result<PipelineRunner, SwarmError> {
    monitoring_pipeline(
        "Environmental Monitoring Agent",
        &["Location 1", "Location 2", "Location 3"],
    )
}

/// Traffic management system: three intersections.
pub fn traffic_management_pipeline() -> Result<PipelineRunner, SwarmError> {
    monitoring_pipeline(
        "Traffic Management Agent",
        &["Intersection 1", "Intersection 2", "Intersection 3"],
    )
}

pub fn monitoring_stages(label: &str, locations: &[&str]) -> Vec<Box<dyn Stage>> {
    locations
        .iter()
        .map(|loc| Box::new(PredictionStage::new(label, *loc)) as Box<dyn Stage>)
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every (system, prompt) pair and answers from a script.
    struct ScriptedGenerator {
        calls: Mutex<Vec<(String, String)>>,
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((system_prompt.to_string(), prompt.to_string()));
            Ok(format!("reply#{} to [{}]", calls.len(), prompt))
        }
    }

    #[test]
    fn test_monitoring_stage_ids_follow_locations() {
        let pipeline = traffic_management_pipeline().unwrap();
        assert_eq!(
            pipeline.stage_ids(),
            vec![
                "Traffic Management Agent Intersection 1",
                "Traffic Management Agent Intersection 2",
                "Traffic Management Agent Intersection 3",
            ]
        );
    }

    #[test]
    fn test_monitoring_requires_a_location() {
        assert_eq!(
            monitoring_pipeline("Agent", &[]).err().unwrap(),
            SwarmError::EmptyPipeline
        );
    }

    #[tokio::test]
    async fn test_monitoring_report_comes_from_last_location() {
        let pipeline = environmental_monitoring_pipeline().unwrap();
        let out = pipeline.run("wildfire season").await.unwrap();
        assert!(out.output.starts_with("Location: Location 3, Prediction: "));
        assert!(out.traces.iter().all(|t| t.deterministic));

        let again = pipeline.run("wildfire season").await.unwrap();
        assert_eq!(out.output, again.output);
    }

    #[tokio::test]
    async fn test_generator_pipeline_chains_designer_into_coder() {
        let generator = Arc::new(ScriptedGenerator {
            calls: Mutex::new(Vec::new()),
        });
        let pipeline = generator_pipeline(generator.clone(), Some(Duration::from_secs(5))).unwrap();

        let out = pipeline.run(prompts::SEED_PROMPT).await.unwrap();

        let calls = generator.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, prompts::ORGANIZATIONAL_DESIGNER_PROMPT);
        assert_eq!(calls[0].1, prompts::SEED_PROMPT);
        assert_eq!(calls[1].0, prompts::SWARM_CODE_GENERATOR_PROMPT);
        assert_eq!(calls[1].1, format!("reply#1 to [{}]", prompts::SEED_PROMPT));
        assert_eq!(out.output, format!("reply#2 to [{}]", calls[1].1));
        assert!(out.traces.iter().all(|t| !t.deterministic));
        assert_eq!(pipeline.pipeline_id(), "Organizational Designer→Swarm Code Generator");
    }
}
