/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! # bundle-dyn
//!
//! Dynamic configuration values with source location tracking.
//!
//! A bundle document is a tree of [`Value`]s. Every node carries the
//! [`Location`] it was written at, so that any diagnostic produced later in
//! the pipeline (normalization, conflict detection, merge policy violations)
//! can point at the exact file, line and column responsible.
//!
//! Nodes inside a tree are addressed with a [`Path`], which renders in the
//! dotted/bracketed form used in error messages:
//!
//! ```rust
//! use bundle_dyn::{Location, Path, Value};
//! use indexmap::IndexMap;
//!
//! let loc = Location::new("bundle.yml", 3, 7);
//! let mut job = IndexMap::new();
//! job.insert("name".to_string(), Value::string("nightly", loc.clone()));
//! let root = Value::mapping(job, loc);
//!
//! let path: Path = "name".parse().unwrap();
//! assert_eq!(root.get_by_path(&path).unwrap().as_str().unwrap(), "nightly");
//! ```

mod error;
mod location;
mod path;
mod value;

pub use error::{DynError, PathError};
pub use location::Location;
pub use path::{Path, PathComponent};
pub use value::{Kind, Value, ValueKind};

/// Insertion-ordered mapping used for mapping values.
pub type Mapping = indexmap::IndexMap<String, Value>;
