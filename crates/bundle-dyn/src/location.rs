/*
 * location.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Source locations attached to values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a value was written.
///
/// Line and column are 1-based. The default location (empty file, line 0)
/// marks values that were never read from a file, e.g. ones built in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File the value was read from. For generated content this may be a
    /// virtual path that does not exist on disk.
    pub file: String,

    /// Line number (1-based)
    pub line: usize,

    /// Column number (1-based, in characters)
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// True for the default location.
    pub fn is_empty(&self) -> bool {
        self.file.is_empty() && self.line == 0 && self.column == 0
    }

    /// Same position, different file.
    pub fn with_file(&self, file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
