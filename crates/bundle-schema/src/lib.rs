/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! # bundle-schema
//!
//! Two ways of checking a configuration value against a schema:
//!
//! - **Strict** ([`InputSchema`]): every key must be declared, every
//!   declared key must be present, and every value must have its declared
//!   type. Used for template input parameters. The first problem is an
//!   error.
//! - **Permissive** ([`normalize`]): walks a document against a static
//!   [`Schema`] tree, coercing scalars where that is lossless, dropping what
//!   does not fit, and recording a [`Diagnostic`](bundle_error_reporting::Diagnostic)
//!   for each problem. The caller decides which diagnostics are fatal.
//!
//! The schema for a whole bundle document is [`root::root_schema`].

mod error;
mod input;
mod normalize;
pub mod root;
mod schema;
mod validators;

pub use error::SchemaError;
pub use input::{InputSchema, Property, PropertyType};
pub use normalize::{is_pure_variable_reference, normalize};
pub use schema::Schema;
pub use validators::{Validator, Validators};
