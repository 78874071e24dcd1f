/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for loading YAML.

use bundle_dyn::{Location, Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    /// Malformed YAML syntax
    #[error("failed to parse {file}:{line}:{column}: {message}")]
    Parse {
        file: String,
        message: String,
        line: usize,
        column: usize,
    },

    /// The same key occurs twice in one mapping
    #[error("duplicate key {key:?} in {path_display} at {second} (first defined at {first})", path_display = display_path(.path))]
    DuplicateKey {
        path: Path,
        key: String,
        first: Location,
        second: Location,
    },

    /// A sequence or mapping used as a mapping key
    #[error("mapping key at {location} must be a scalar")]
    NonStringKey { location: Location },

    #[error("failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

fn display_path(path: &Path) -> String {
    if path.is_empty() {
        "document root".to_string()
    } else {
        format!("\"{}\"", path)
    }
}
