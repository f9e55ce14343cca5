use swarm_core::{ExecutionContext, Stage, StageError};

/// Monitoring agent bound to one location.
///
/// Emits `Location: <location>, Prediction: <p>` with `p` in `[0, 1)`. The
/// prediction is a pure function of the location and the incoming payload, so
/// the same chain fed the same input always produces the same report.
#[derive(Debug, Clone)]
pub struct PredictionStage {
    id: String,
    location: String,
}

impl PredictionStage {
    /// `label` is the agent family (ex: "Traffic Management Agent"); the stage
    /// id becomes `"<label> <location>"`.
    pub fn new(label: &str, location: impl Into<String>) -> Self {
        let location = location.into();
        Self {
            id: format!("{} {}", label.trim(), location),
            location,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn predict(&self, input: &str) -> f64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.location.as_bytes());
        hasher.update(&[0]);
        hasher.update(input.as_bytes());
        let digest = hasher.finalize();

        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        // 53 high bits → uniform f64 in [0, 1)
        (u64::from_le_bytes(head) >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl Stage for PredictionStage {
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, input: &str, _ctx: &ExecutionContext) -> Result<String, StageError> {
        let prediction = self.predict(input);
        Ok(format!(
            "Location: {}, Prediction: {:.6}",
            self.location, prediction
        ))
    }
}
