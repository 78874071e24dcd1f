/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for loading and changing bundle documents.

use crate::Change;
use bundle_dyn::{Location, Path};
use thiserror::Error;

/// A merge was stopped by its visitor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("unexpected change at \"{path}\" ({change})")]
    Violation { path: Path, change: Change },
}

/// One name declared by more than one resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("multiple resources named {name} ({})", describe_occurrences(.occurrences))]
pub struct ConflictError {
    pub name: String,

    /// `(kind, location)` of every declaration, in file scan order
    pub occurrences: Vec<(String, Location)>,
}

fn describe_occurrences(occurrences: &[(String, Location)]) -> String {
    occurrences
        .iter()
        .map(|(kind, location)| format!("{} at {}", kind, location))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("unable to locate bundle root: none of {names} found in {dir}", names = crate::ROOT_FILE_NAMES.join(", "))]
    RootNotFound { dir: String },

    #[error("invalid include at {location}: {reason}")]
    InvalidInclude { location: Location, reason: String },

    #[error("invalid include pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to expand include pattern {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::GlobError,
    },

    #[error(transparent)]
    Load(#[from] bundle_yaml::LoadError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}
