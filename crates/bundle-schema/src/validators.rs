/*
 * validators.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Type checks for input parameters, keyed by declared type.
 */

use crate::PropertyType;
use bundle_dyn::{Value, ValueKind};
use std::collections::HashMap;

/// Checks that a value fits a declared type, describing the mismatch if not.
pub type Validator = fn(&Value) -> Result<(), String>;

/// Dispatch table from declared type to its check.
///
/// A type with no entry accepts any value. The table is built once and
/// passed to [`InputSchema::validate_with`](crate::InputSchema::validate_with).
#[derive(Debug, Clone, Default)]
pub struct Validators {
    table: HashMap<PropertyType, Validator>,
}

impl Validators {
    /// A table with no checks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard checks for every [`PropertyType`].
    pub fn builtin() -> Self {
        Self::empty()
            .with(PropertyType::String, validate_string)
            .with(PropertyType::Integer, validate_integer)
            .with(PropertyType::Number, validate_number)
            .with(PropertyType::Boolean, validate_boolean)
    }

    pub fn with(mut self, property_type: PropertyType, validator: Validator) -> Self {
        self.table.insert(property_type, validator);
        self
    }

    pub fn validate(&self, property_type: PropertyType, value: &Value) -> Result<(), String> {
        match self.table.get(&property_type) {
            Some(validator) => validator(value),
            None => Ok(()),
        }
    }
}

/// Render a value the way mismatch messages show it: strings quoted.
fn describe(value: &Value) -> String {
    match value.inner() {
        ValueKind::String(s) => format!("{:?}", s),
        _ => value.to_string(),
    }
}

fn mismatch(expected: PropertyType, value: &Value) -> String {
    format!("expected type {}, but value is {}", expected, describe(value))
}

fn validate_string(value: &Value) -> Result<(), String> {
    match value.inner() {
        ValueKind::String(_) => Ok(()),
        _ => Err(mismatch(PropertyType::String, value)),
    }
}

fn validate_integer(value: &Value) -> Result<(), String> {
    match value.inner() {
        ValueKind::Int(_) => Ok(()),
        _ => Err(mismatch(PropertyType::Integer, value)),
    }
}

fn validate_number(value: &Value) -> Result<(), String> {
    match value.inner() {
        ValueKind::Int(_) | ValueKind::Float(_) => Ok(()),
        _ => Err(mismatch(PropertyType::Number, value)),
    }
}

fn validate_boolean(value: &Value) -> Result<(), String> {
    match value.inner() {
        ValueKind::Bool(_) => Ok(()),
        _ => Err(mismatch(PropertyType::Boolean, value)),
    }
}
