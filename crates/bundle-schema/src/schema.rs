/*
 * schema.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Static schema trees for permissive normalization.

use indexmap::IndexMap;
use std::fmt;

/// The expected shape of a document node.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String,
    Int,
    Float,
    Bool,
    /// Anything, kept unchanged
    Any,
    /// A sequence whose items all have the given shape
    Sequence(Box<Schema>),
    /// A mapping with free-form keys whose values have the given shape
    Map(Box<Schema>),
    /// A mapping with a closed set of known fields
    Object(IndexMap<String, Schema>),
}

impl Schema {
    pub fn sequence(item: Schema) -> Self {
        Schema::Sequence(Box::new(item))
    }

    pub fn map(value: Schema) -> Self {
        Schema::Map(Box::new(value))
    }

    pub fn object<'a>(fields: impl IntoIterator<Item = (&'a str, Schema)>) -> Self {
        Schema::Object(
            fields
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
        )
    }

    /// Look up a field of an `Object` schema.
    pub fn field(&self, name: &str) -> Option<&Schema> {
        match self {
            Schema::Object(fields) => fields.get(name),
            _ => None,
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Schema::String => "string",
            Schema::Int => "int",
            Schema::Float => "float",
            Schema::Bool => "bool",
            Schema::Any => "any",
            Schema::Sequence(_) => "sequence",
            Schema::Map(_) | Schema::Object(_) => "map",
        };
        write!(f, "{}", name)
    }
}
