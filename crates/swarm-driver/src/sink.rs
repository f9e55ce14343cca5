//! Output sinks for generated programs
use crate::error::DriverError;
use chrono::{DateTime, TimeZone};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where a successful run's text ends up.
pub trait OutputSink: Send + Sync {
    /// Persists `contents` under `file_name`, returning the final location.
    fn write(&self, file_name: &str, contents: &str) -> Result<PathBuf, DriverError>;
}

/// `generated_code_YYYYmmddHHMMSS.py`
pub fn generated_file_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("generated_code_{}.py", at.format("%Y%m%d%H%M%S"))
}

/// Writes each output as a new file inside one directory.
///
/// Never overwrites: when the name is taken (two runs in the same second), a
/// `_1`, `_2`, … suffix is added before the extension.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn candidate(&self, file_name: &str, n: u32) -> PathBuf {
        if n == 0 {
            return self.dir.join(file_name);
        }
        let path = Path::new(file_name);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.dir.join(format!("{stem}_{n}.{ext}")),
            None => self.dir.join(format!("{stem}_{n}")),
        }
    }
}

impl OutputSink for FileSink {
    fn write(&self, file_name: &str, contents: &str) -> Result<PathBuf, DriverError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| DriverError::io(&self.dir, e))?;

        let mut n = 0;
        loop {
            let path = self.candidate(file_name, n);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    write_or_remove(&path, file, contents)?;
                    info!(path = %path.display(), bytes = contents.len(), "generated code saved");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(DriverError::io(&path, e)),
            }
        }
    }
}

/// Writes `contents` to a freshly created `path`; a partial file is removed.
fn write_or_remove(path: &Path, mut out: impl Write, contents: &str) -> Result<(), DriverError> {
    match out.write_all(contents.as_bytes()).and_then(|()| out.flush()) {
        Ok(()) => Ok(()),
        Err(e) => {
            drop(out);
            if let Err(cleanup) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %cleanup, "could not remove partial file");
            }
            Err(DriverError::io(path, e))
        }
    }
}
