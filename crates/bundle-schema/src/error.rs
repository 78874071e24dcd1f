/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Errors from strict input validation.

use bundle_dyn::{Kind, Location};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("{key} is not defined as an input parameter for the template")]
    UndeclaredKey { key: String },

    #[error("input parameter {key} is not defined in config")]
    MissingKey { key: String },

    #[error("expected {key} to have integer value but it is {value}")]
    NotAnInteger { key: String, value: f64 },

    #[error("incorrect type for {key}. {message}")]
    TypeMismatch { key: String, message: String },

    /// The config file does not hold a mapping of parameters
    #[error("expected config at {location} to be a map, found {found}")]
    NotAMapping { location: Location, found: Kind },

    #[error(transparent)]
    Load(#[from] bundle_yaml::LoadError),

    #[error("failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}
