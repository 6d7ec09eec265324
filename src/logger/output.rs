//! Output destinations.

use parking_lot::Mutex;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use super::rotate::{RotatingFile, RotationPolicy};
use crate::config::LogConfig;
use crate::error::{Error, Result};

enum Target {
    Stdout,
    Stderr,
    File(Mutex<RotatingFile>),
    Buffer(Arc<Mutex<Vec<u8>>>),
}

/// Shared handle to a log destination. Each record is written with a single
/// `write_all` so concurrent records never interleave.
#[derive(Clone)]
pub struct Output {
    target: Arc<Target>,
}

impl Output {
    pub fn stdout() -> Self {
        Self::from_target(Target::Stdout)
    }

    pub fn stderr() -> Self {
        Self::from_target(Target::Stderr)
    }

    /// Rotating file sink, creating the parent directory.
    pub fn file(path: impl Into<PathBuf>, policy: RotationPolicy) -> Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }
        let file = RotatingFile::open(&path, policy).map_err(|e| Error::io(&path, e))?;
        Ok(Self::from_target(Target::File(Mutex::new(file))))
    }

    /// In-memory sink; the returned buffer receives every encoded record.
    pub fn buffer() -> (Self, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        (
            Self::from_target(Target::Buffer(Arc::clone(&buffer))),
            buffer,
        )
    }

    /// Destination selected by `log.output`; unknown values fall back to stdout.
    pub fn from_config(config: &LogConfig) -> Result<Self> {
        match config.output.as_str() {
            "stderr" => Ok(Self::stderr()),
            "file" => Self::file(&config.file.path, RotationPolicy::from(&config.file)),
            _ => Ok(Self::stdout()),
        }
    }

    fn from_target(target: Target) -> Self {
        Self {
            target: Arc::new(target),
        }
    }

    pub fn write_record(&self, bytes: &[u8]) -> io::Result<()> {
        match &*self.target {
            Target::Stdout => io::stdout().lock().write_all(bytes),
            Target::Stderr => io::stderr().lock().write_all(bytes),
            Target::File(file) => {
                let mut file = file.lock();
                file.write_all(bytes)?;
                file.flush()
            }
            Target::Buffer(buffer) => {
                buffer.lock().extend_from_slice(bytes);
                Ok(())
            }
        }
    }

    pub fn flush(&self) -> io::Result<()> {
        match &*self.target {
            Target::Stdout => io::stdout().flush(),
            Target::Stderr => io::stderr().flush(),
            Target::File(file) => file.lock().flush(),
            Target::Buffer(_) => Ok(()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match &*self.target {
            Target::Stdout => "stdout",
            Target::Stderr => "stderr",
            Target::File(_) => "file",
            Target::Buffer(_) => "buffer",
        }
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Output").field(&self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_buffer_output_collects_records() {
        let (output, buffer) = Output::buffer();
        output.write_record(b"one\n").unwrap();
        output.clone().write_record(b"two\n").unwrap();

        assert_eq!(&*buffer.lock(), b"one\ntwo\n");
    }

    #[test]
    fn test_from_config_selects_target() {
        let dir = TempDir::new().unwrap();
        let mut config = LogConfig {
            output: "stderr".to_string(),
            ..Default::default()
        };
        assert_eq!(Output::from_config(&config).unwrap().kind(), "stderr");

        config.output = "file".to_string();
        config.file.path = dir
            .path()
            .join("logs")
            .join("app.log")
            .to_string_lossy()
            .into_owned();
        config.file.max_size = 1;
        let output = Output::from_config(&config).unwrap();
        assert_eq!(output.kind(), "file");
        output.write_record(b"line\n").unwrap();
        assert!(dir.path().join("logs").join("app.log").exists());
    }
}
