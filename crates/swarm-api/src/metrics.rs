//! Prometheus registry backing `/metrics`.
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    runs: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let runs = IntCounterVec::new(
            Opts::new("swarm_pipeline_runs_total", "Pipeline invocations by outcome"),
            &["endpoint", "outcome"],
        )?;
        registry.register(Box::new(runs.clone()))?;
        Ok(Self { registry, runs })
    }

    pub fn record_run(&self, endpoint: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "failed" };
        self.runs.with_label_values(&[endpoint, outcome]).inc();
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_outcome() {
        let metrics = Metrics::new().unwrap();
        metrics.record_run("run", true);
        metrics.record_run("run", true);
        metrics.record_run("chat", false);

        let text = metrics.encode().unwrap();
        assert!(text.contains(r#"swarm_pipeline_runs_total{endpoint="run",outcome="ok"} 2"#));
        assert!(text.contains(r#"swarm_pipeline_runs_total{endpoint="chat",outcome="failed"} 1"#));
    }
}
