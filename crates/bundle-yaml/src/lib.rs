/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! # bundle-yaml
//!
//! Parses YAML (and therefore JSON) text into [`bundle_dyn::Value`] trees in
//! which every node carries the file, line and column it was written at.
//!
//! Unlike a plain YAML loader this one rejects duplicate keys, since a
//! silently shadowed key in a bundle file is almost always a mistake.
//!
//! ```rust
//! use bundle_yaml::load;
//!
//! let value = load("bundle.yml", "bundle:\n  name: demo\n").unwrap();
//! let name = value.get("bundle").unwrap().get("name").unwrap();
//! assert_eq!(name.as_str().unwrap(), "demo");
//! assert_eq!(name.location().to_string(), "bundle.yml:2:9");
//! ```

mod error;
mod loader;
mod scalar;

pub use error::LoadError;
pub use loader::{load, load_file, load_file_as, load_with_virtual_path};
