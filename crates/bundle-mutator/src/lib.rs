/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! # bundle-mutator
//!
//! Lets an external plugin process rewrite a bundle document, one phase at
//! a time, under a per-phase change policy.
//!
//! Each [`PluginMutator`] hands the current document to the plugin over an
//! [`Exchange`], runs the plugin through a [`ProcessRunner`], normalizes what
//! comes back against the root schema, and overrides the document with it.
//! The override is checked by the phase's
//! [`OverridePolicy`](bundle_config::OverridePolicy):
//!
//! | phase  | policy                                 |
//! |--------|----------------------------------------|
//! | `load` | append-only: new entries under `resources.jobs` |
//! | `init` | amend: anything under `resources.jobs` except removing entries |
//!
//! [`Pipeline`] runs both phases in order and stops at the first failure.
//! A failed phase leaves the document untouched.

mod cache;
mod error;
mod exchange;
mod mutator;
mod options;
mod phase;
mod pipeline;
mod runner;

pub use cache::CacheDir;
pub use error::MutatorError;
pub use exchange::{Exchange, FileExchange, MemoryExchange};
pub use mutator::{PluginMutator, VIRTUAL_FILE_NAME};
pub use options::{
    DEFAULT_ENTRY_MODULE, MutatorOptions, PluginConfig, TEMP_ROOT_ENV, interpreter_path,
    resolve_temp_root,
};
pub use phase::Phase;
pub use pipeline::Pipeline;
pub use runner::{Invocation, ProcessRunner, TokioProcessRunner};
