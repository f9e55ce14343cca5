//! Swarm Driver: configuration, output sink and the bounded generation loop
//! around the designer → code-generator chain.

pub mod config;
pub mod error;
pub mod generator;
pub mod sink;

pub use config::DriverConfig;
pub use error::DriverError;
pub use generator::{GenerationSummary, Generator};
pub use sink::{generated_file_name, FileSink, OutputSink};
