//! Driver configuration
//!
//! Loaded from an optional YAML file, then overridden by environment
//! variables:
//!
//! | variable           | field              |
//! |--------------------|--------------------|
//! | `GROQ_API_KEY`     | `llm.api_key`      |
//! | `SWARM_MODEL`      | `llm.model`        |
//! | `SWARM_BASE_URL`   | `llm.base_url`     |
//! | `SWARM_OUTPUT_DIR` | `output_dir`       |
//! | `SWARM_RUNS`       | `runs`             |

use crate::error::DriverError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use swarm_core::RetryPolicy;
use swarm_stages::{prompts, LlmConfig, API_KEY_VAR, DEFAULT_STAGE_TIMEOUT_SECS};

pub const OUTPUT_DIR_VAR: &str = "SWARM_OUTPUT_DIR";
pub const RUNS_VAR: &str = "SWARM_RUNS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub llm: LlmConfig,
    pub retry: RetryPolicy,
    /// Directory generated programs are written into
    pub output_dir: PathBuf,
    /// Number of programs to generate before exiting
    pub runs: u32,
    /// Stop at the first run whose retries are exhausted
    pub stop_on_failure: bool,
    /// Upper bound for each stage call; unset waits indefinitely
    pub stage_timeout_secs: Option<u64>,
    pub seed_prompt: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            retry: RetryPolicy::default(),
            output_dir: PathBuf::from("results"),
            runs: 1,
            stop_on_failure: false,
            stage_timeout_secs: Some(DEFAULT_STAGE_TIMEOUT_SECS),
            seed_prompt: prompts::SEED_PROMPT.to_string(),
        }
    }
}

impl DriverConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, DriverError> {
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// File (if given) + process environment, validated.
    pub fn load(path: Option<&Path>) -> Result<Self, DriverError> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| DriverError::io(path, e))?;
                Self::from_yaml_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), DriverError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.llm.apply_env(&lookup);
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = lookup(OUTPUT_DIR_VAR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(runs) = lookup(RUNS_VAR) {
            self.runs = runs
                .trim()
                .parse::<u32>()
                .map_err(|e| DriverError::Config(format!("{RUNS_VAR}={runs:?}: {e}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DriverError> {
        if self.runs == 0 {
            return Err(DriverError::Config("runs must be at least 1".into()));
        }
        if self.stage_timeout_secs == Some(0) {
            return Err(DriverError::Config("stage_timeout_secs must be positive".into()));
        }
        if self.seed_prompt.trim().is_empty() {
            return Err(DriverError::Config("seed_prompt is empty".into()));
        }
        self.retry.validate()?;
        Ok(())
    }

    pub fn require_api_key(&self) -> Result<&str, DriverError> {
        self.llm
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(DriverError::MissingApiKey(API_KEY_VAR))
    }

    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid_but_need_a_key() {
        let config = DriverConfig::default();
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.require_api_key(),
            Err(DriverError::MissingApiKey("GROQ_API_KEY"))
        ));
        assert_eq!(config.stage_timeout(), Some(Duration::from_secs(180)));
    }

    #[test]
    fn yaml_overrides_defaults() {
        let config = DriverConfig::from_yaml_str(
            r#"
llm:
  model: llama-3.1-8b-instant
  temperature: 0.7
retry:
  max_attempts: 5
  backoff_ms: 250
output_dir: out
runs: 4
stop_on_failure: true
"#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.temperature, Some(0.7));
        assert_eq!(config.llm.base_url, swarm_stages::DEFAULT_BASE_URL);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.runs, 4);
        assert!(config.stop_on_failure);
        assert_eq!(config.seed_prompt, prompts::SEED_PROMPT);
    }

    #[test]
    fn env_wins_over_file() {
        let mut config = DriverConfig::from_yaml_str("runs: 2\noutput_dir: from-file\n").unwrap();
        config.apply_env(env(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("SWARM_OUTPUT_DIR", "from-env"),
            ("SWARM_RUNS", "7"),
            ("SWARM_MODEL", "  "),
        ]))
        .unwrap();

        assert_eq!(config.require_api_key().unwrap(), "gsk_test");
        assert_eq!(config.output_dir, PathBuf::from("from-env"));
        assert_eq!(config.runs, 7);
        assert_eq!(config.llm.model, swarm_stages::DEFAULT_MODEL);
    }

    #[test]
    fn malformed_runs_from_env_is_reported() {
        let mut config = DriverConfig::default();
        let err = config.apply_env(env(&[("SWARM_RUNS", "abc")])).unwrap_err();

        assert!(matches!(err, DriverError::Config(ref msg) if msg.contains("SWARM_RUNS")));
        assert_eq!(config.runs, 1);
    }

    #[test]
    fn invalid_values_rejected() {
        let zero_runs = DriverConfig {
            runs: 0,
            ..DriverConfig::default()
        };
        assert!(matches!(zero_runs.validate(), Err(DriverError::Config(_))));

        let zero_attempts = DriverConfig::from_yaml_str("retry:\n  max_attempts: 0\n").unwrap();
        assert!(matches!(zero_attempts.validate(), Err(DriverError::Pipeline(_))));

        assert!(DriverConfig::from_yaml_str("runs: [1, 2]").is_err());
    }
}
