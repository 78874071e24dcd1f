/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for value access and path parsing.

use crate::{Kind, Location, Path};
use thiserror::Error;

/// Errors from accessing or navigating a [`Value`](crate::Value).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DynError {
    /// The caller assumed the wrong kind of value.
    #[error("expected {expected}, found {found} at {location}")]
    TypeMismatch {
        expected: Kind,
        found: Kind,
        location: Location,
    },

    /// A mapping does not contain the requested key.
    #[error("key not found at \"{path}\"")]
    KeyNotFound { path: Path },

    /// A sequence is shorter than the requested index.
    #[error("index out of bounds at \"{path}\" (length {len})")]
    IndexOutOfBounds { path: Path, len: usize },
}

/// Errors from parsing a path string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("invalid path {path:?}: empty key")]
    EmptyKey { path: String },

    #[error("invalid path {path:?}: {index:?} is not a valid index")]
    InvalidIndex { path: String, index: String },

    #[error("invalid path {path:?}: unclosed bracket")]
    UnclosedBracket { path: String },

    #[error("invalid path {path:?}: unexpected character {character:?}")]
    UnexpectedCharacter { path: String, character: char },
}
