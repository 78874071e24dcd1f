/*
 * cache.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Scratch directory for the plugin exchange files.
 */

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Where the exchange files of one phase live.
#[derive(Debug)]
pub enum CacheDir {
    /// `<temp-root>/default/plugin`, kept and reused across calls.
    Stable(PathBuf),
    /// A fresh directory removed when this value is dropped.
    Ephemeral(TempDir),
}

impl CacheDir {
    /// Create the cache directory, under `temp_root` if one is configured.
    pub fn create(temp_root: Option<&Path>) -> std::io::Result<CacheDir> {
        match temp_root {
            Some(root) => {
                let dir = root.join("default").join("plugin");
                create_private_dir(&dir)?;
                Ok(CacheDir::Stable(dir))
            }
            None => Ok(CacheDir::Ephemeral(
                tempfile::Builder::new().suffix("-plugin").tempdir()?,
            )),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            CacheDir::Stable(path) => path,
            CacheDir::Ephemeral(dir) => dir.path(),
        }
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}
