/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

use bundle_config::MergeError;
use bundle_yaml::LoadError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from one plugin phase.
#[derive(Debug, Error)]
pub enum MutatorError {
    /// `experimental.plugin` is present but unusable.
    #[error("{message}")]
    Config { message: String },

    #[error("can't find \"{}\", check if venv is created", .path.display())]
    InterpreterNotFound { path: PathBuf },

    #[error("failed to create cache dir: {source}")]
    CacheDir {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Reading or writing one of the exchange channels failed.
    #[error("failed to access {name}: {source}")]
    Exchange {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The plugin could not be started or exited unsuccessfully.
    #[error("plugin process failed: {reason}")]
    Process { program: PathBuf, reason: String },

    #[error("plugin process was cancelled")]
    Cancelled,

    #[error("failed to parse plugin output: {0}")]
    OutputParse(#[source] LoadError),

    /// The plugin output did not normalize cleanly. Warnings count.
    #[error("failed to normalize plugin output: {summary}")]
    PluginOutput { summary: String },

    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl MutatorError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        MutatorError::Config {
            message: message.into(),
        }
    }
}
