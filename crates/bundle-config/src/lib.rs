/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! # bundle-config
//!
//! Turns a directory of bundle files into one [`Document`] and controls how
//! that document may change afterwards.
//!
//! - [`Bundle::load`] reads the root file and its includes, rejects
//!   resources declared twice under the same name ([`detect_conflicts`]),
//!   and folds the files together with the structural [`merge`].
//! - [`override_value`] replaces a document with a proposed new version,
//!   asking an [`OverrideVisitor`] to approve every insert, update and
//!   delete. [`OverridePolicy`] provides the visitors the mutation phases
//!   use.

mod conflict;
mod document;
mod error;
mod loader;
mod merge;
mod override_;
mod policy;

pub use conflict::{LoadedFile, detect_conflicts};
pub use document::Document;
pub use error::{BundleError, ConflictError, MergeError};
pub use loader::{Bundle, ROOT_FILE_NAMES};
pub use merge::merge;
pub use override_::{Change, OverrideVisitor, override_value};
pub use policy::OverridePolicy;
