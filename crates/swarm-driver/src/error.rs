//! Driver Error Model
use std::path::PathBuf;
use swarm_core::SwarmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("CONFIG/{0}")]
    Config(String),

    #[error("CONFIG/YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CONFIG/MISSING: {0} environment variable is not set")]
    MissingApiKey(&'static str),

    #[error("SINK/IO: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Pipeline(#[from] SwarmError),
}

impl DriverError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
