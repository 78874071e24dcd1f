/*
 * exchange.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The two channels a plugin reads its input from and writes its output to.
 */

use crate::MutatorError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A pair of named byte channels shared with the plugin.
///
/// The names are what the plugin receives as `--input` and `--output`.
pub trait Exchange: Send + Sync {
    fn input_name(&self) -> String;

    fn output_name(&self) -> String;

    fn write_input(&self, bytes: &[u8]) -> Result<(), MutatorError>;

    fn read_output(&self) -> Result<Vec<u8>, MutatorError>;
}

/// `input.json` and `output.json` in a directory.
#[derive(Debug, Clone)]
pub struct FileExchange {
    input: PathBuf,
    output: PathBuf,
}

impl FileExchange {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            input: dir.join("input.json"),
            output: dir.join("output.json"),
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.input
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }
}

impl Exchange for FileExchange {
    fn input_name(&self) -> String {
        self.input.display().to_string()
    }

    fn output_name(&self) -> String {
        self.output.display().to_string()
    }

    fn write_input(&self, bytes: &[u8]) -> Result<(), MutatorError> {
        write_private(&self.input, bytes).map_err(|source| MutatorError::Exchange {
            name: self.input_name(),
            source,
        })
    }

    fn read_output(&self) -> Result<Vec<u8>, MutatorError> {
        std::fs::read(&self.output).map_err(|source| MutatorError::Exchange {
            name: self.output_name(),
            source,
        })
    }
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(bytes)
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)
}

/// In-memory channels, for embedders that talk to the plugin some other
/// way and for tests.
#[derive(Debug, Default)]
pub struct MemoryExchange {
    input: Mutex<Vec<u8>>,
    output: Mutex<Option<Vec<u8>>>,
}

impl MemoryExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last input written.
    pub fn input(&self) -> Vec<u8> {
        lock(&self.input).clone()
    }

    pub fn set_output(&self, bytes: impl Into<Vec<u8>>) {
        *lock(&self.output) = Some(bytes.into());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Exchange for MemoryExchange {
    fn input_name(&self) -> String {
        "memory:input".to_string()
    }

    fn output_name(&self) -> String {
        "memory:output".to_string()
    }

    fn write_input(&self, bytes: &[u8]) -> Result<(), MutatorError> {
        *lock(&self.input) = bytes.to_vec();
        Ok(())
    }

    fn read_output(&self) -> Result<Vec<u8>, MutatorError> {
        lock(&self.output).clone().ok_or_else(|| MutatorError::Exchange {
            name: self.output_name(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no output was written"),
        })
    }
}
