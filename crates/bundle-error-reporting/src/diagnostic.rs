/*
 * diagnostic.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Core diagnostic types.
 */

use bundle_dyn::{Location, Path};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The node was kept or dropped, but the document is still usable
    Warning,
    /// The node could not be used
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single problem found in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,

    /// One-line description, e.g. `unknown field: foo`
    pub summary: String,

    /// Path of the offending node
    pub path: Path,

    /// Where the offending node was written
    pub location: Location,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        summary: impl Into<String>,
        path: Path,
        location: Location,
    ) -> Self {
        Self {
            severity,
            summary: summary.into(),
            path,
            location,
        }
    }

    pub fn error(summary: impl Into<String>, path: Path, location: Location) -> Self {
        Self::new(Severity::Error, summary, path, location)
    }

    pub fn warning(summary: impl Into<String>, path: Path, location: Location) -> Self {
        Self::new(Severity::Warning, summary, path, location)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Render as a JSON object.
    ///
    /// ```
    /// use bundle_dyn::{Location, Path};
    /// use bundle_error_reporting::Diagnostic;
    ///
    /// let diag = Diagnostic::warning(
    ///     "unknown field: foo",
    ///     "resources.jobs.job0.foo".parse().unwrap(),
    ///     Location::new("bundle.yml", 4, 7),
    /// );
    /// let json = diag.to_json();
    /// assert_eq!(json["severity"], "warning");
    /// assert_eq!(json["path"], "resources.jobs.job0.foo");
    /// assert_eq!(json["location"]["line"], 4);
    /// ```
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut obj = json!({
            "severity": self.severity,
            "summary": self.summary,
            "path": self.path.to_string(),
        });
        if !self.location.is_empty() {
            obj["location"] = json!(self.location);
        }
        obj
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{}: {}", self.severity, self.summary)
        } else {
            write!(f, "{}: {}: {}", self.location, self.severity, self.summary)
        }
    }
}

/// An ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.0.iter().any(Diagnostic::is_warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.is_warning())
    }

    /// The most relevant diagnostic: the first error, else the first warning.
    pub fn first(&self) -> Option<&Diagnostic> {
        self.errors().next().or_else(|| self.0.first())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Diagnostics(iter.into_iter().collect())
    }
}
