//! Integration tests for the generation loop with in-process stages.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use swarm_core::{FnStage, PipelineRunner, RetryPolicy, StageError};
use swarm_driver::{DriverConfig, DriverError, FileSink, Generator, OutputSink};

/// Keeps writes in memory.
#[derive(Default, Clone)]
struct MemorySink {
    files: Arc<Mutex<Vec<(String, String)>>>,
}

impl OutputSink for MemorySink {
    fn write(&self, file_name: &str, contents: &str) -> Result<PathBuf, DriverError> {
        self.files
            .lock()
            .unwrap()
            .push((file_name.to_string(), contents.to_string()));
        Ok(PathBuf::from(file_name))
    }
}

fn chain() -> PipelineRunner {
    PipelineRunner::builder()
        .stage(FnStage::new("designer", |x| Ok(format!("org for <{x}>"))))
        .stage(FnStage::new("coder", |x| Ok(format!("# program\n# {x}\n"))))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_each_successful_run_writes_one_file() {
    let tmp = tempfile::tempdir().unwrap();
    let generator = Generator::new(chain(), FileSink::new(tmp.path()), "seed").runs(3);

    let summary = generator.run().await.unwrap();

    assert_eq!(summary.succeeded(), 3);
    assert!(summary.failures.is_empty());
    assert_eq!(summary.attempts, 3);
    for path in &summary.written {
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("generated_code_"), "{name}");
        assert!(name.ends_with(".py"), "{name}");
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "# program\n# org for <seed>\n"
        );
    }
}

#[tokio::test]
async fn test_failed_run_writes_nothing_and_continues() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let pipeline = PipelineRunner::builder()
        .stage(FnStage::new("flaky", move |x| {
            // every other call fails, starting with the first
            if seen.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Err(StageError::execution("provider error"))
            } else {
                Ok(x.to_string())
            }
        }))
        .build()
        .unwrap();
    let sink = MemorySink::default();

    let summary = Generator::new(pipeline, sink.clone(), "seed")
        .runs(2)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].stage_id, "flaky");
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(sink.files.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_retry_recovers_within_a_run() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let pipeline = PipelineRunner::builder()
        .stage(FnStage::new("flaky", move |x| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(StageError::execution("timeout talking to provider"))
            } else {
                Ok(x.to_string())
            }
        }))
        .build()
        .unwrap();
    let sink = MemorySink::default();

    let summary = Generator::new(pipeline, sink.clone(), "seed")
        .retry(RetryPolicy::new(2, Duration::ZERO).unwrap())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.attempts, 2);
    assert_eq!(sink.files.lock().unwrap()[0].1, "seed");
}

#[tokio::test]
async fn test_stop_on_failure_ends_loop() {
    let pipeline = PipelineRunner::builder()
        .stage(FnStage::new("down", |_| Err(StageError::execution("no"))))
        .build()
        .unwrap();

    let summary = Generator::new(pipeline, MemorySink::default(), "seed")
        .runs(5)
        .stop_on_failure(true)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.attempts, 1);
}

#[tokio::test]
async fn test_from_config_uses_seed_and_runs() {
    let config = DriverConfig::from_yaml_str(
        "runs: 2\nseed_prompt: design a fleet\nretry:\n  max_attempts: 1\n  backoff_ms: 0\n",
    )
    .unwrap();
    let sink = MemorySink::default();

    let summary = Generator::from_config(chain(), sink.clone(), &config)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.succeeded(), 2);
    let files = sink.files.lock().unwrap();
    assert!(files[0].1.contains("org for <design a fleet>"));
}

/// Path to the example config relative to the workspace root
const EXAMPLE_CONFIG: &str = "config/swarm.example.yaml";

fn example_config_path() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    workspace_root.join(EXAMPLE_CONFIG)
}

#[test]
fn test_example_config_is_valid() {
    let content = std::fs::read_to_string(example_config_path()).unwrap();
    let config = DriverConfig::from_yaml_str(&content).unwrap();

    config.validate().unwrap();
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.stage_timeout(), Some(Duration::from_secs(180)));
}
