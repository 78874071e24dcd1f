/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Diagnostics for bundle configuration.
//!
//! Normalization does not stop at the first problem: it records a
//! [`Diagnostic`] for every node it had to drop or could not coerce, and
//! leaves the decision of what is fatal to the caller. A diagnostic names the
//! [`Path`](bundle_dyn::Path) of the node and the
//! [`Location`](bundle_dyn::Location) it was written at.
//!
//! Rendering:
//! - [`Diagnostic::to_text`] produces a compiler-style report with source
//!   context via ariadne when the source text is available, and a one-line
//!   form otherwise;
//! - [`Diagnostic::to_json`] produces a machine-readable object.

mod diagnostic;
mod render;

pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use render::SourceCache;
