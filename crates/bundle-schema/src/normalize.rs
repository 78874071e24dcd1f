/*
 * normalize.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Permissive normalization of documents against a static schema.
 */

use crate::Schema;
use crate::input::exact_integer;
use bundle_dyn::{Location, Mapping, Path, Value, ValueKind};
use bundle_error_reporting::{Diagnostic, Diagnostics};
use once_cell::sync::Lazy;
use regex::Regex;

static PURE_VARIABLE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\$\{[a-zA-Z]+([-_]?[a-zA-Z0-9]+)*(\[[0-9]+\])*(\.[a-zA-Z]+([-_]?[a-zA-Z0-9]+)*(\[[0-9]+\])*)*\}$",
    )
    .expect("valid regex")
});

/// True if `s` consists of exactly one `${...}` variable reference.
///
/// Such strings are resolved later, so they are accepted for any scalar type.
pub fn is_pure_variable_reference(s: &str) -> bool {
    PURE_VARIABLE_REFERENCE.is_match(s)
}

/// Normalize `value` against `schema`.
///
/// Returns the normalized tree together with every problem found:
/// - a field not declared by an [`Schema::Object`] is dropped with a warning;
/// - a node of the wrong kind is dropped with an error;
/// - scalars are coerced where nothing is lost, e.g. `"3"` or `3.0` to an
///   int, `true` to `"true"`.
///
/// `null` and `${...}` references are accepted anywhere. A root node of the
/// wrong kind becomes `null`.
pub fn normalize(schema: &Schema, value: &Value) -> (Value, Diagnostics) {
    let mut diags = Diagnostics::new();
    let normalized = normalize_node(schema, value, &Path::root(), &mut diags)
        .unwrap_or_else(|| Value::null(value.location().clone()));
    if !diags.is_empty() {
        tracing::debug!(
            errors = diags.errors().count(),
            warnings = diags.warnings().count(),
            "normalization produced diagnostics"
        );
    }
    (normalized, diags)
}

/// `None` means the node is dropped from its parent.
fn normalize_node(
    schema: &Schema,
    value: &Value,
    path: &Path,
    diags: &mut Diagnostics,
) -> Option<Value> {
    if value.is_null() {
        return Some(value.clone());
    }

    match schema {
        Schema::Any => Some(value.clone()),
        Schema::String => normalize_string(value, path, diags),
        Schema::Bool => normalize_bool(value, path, diags),
        Schema::Int => normalize_int(value, path, diags),
        Schema::Float => normalize_float(value, path, diags),
        Schema::Sequence(item) => {
            let Ok(items) = value.as_sequence() else {
                return mismatch(schema, value, path, diags);
            };
            let items = items
                .iter()
                .enumerate()
                .filter_map(|(i, v)| normalize_node(item, v, &path.append_index(i), diags))
                .collect();
            Some(Value::sequence(items, value.location().clone()))
        }
        Schema::Map(item) => {
            let Ok(entries) = value.as_mapping() else {
                return mismatch(schema, value, path, diags);
            };
            let mut out = Mapping::with_capacity(entries.len());
            for (key, v) in entries {
                if let Some(v) = normalize_node(item, v, &path.append_key(key.clone()), diags) {
                    out.insert(key.clone(), v);
                }
            }
            Some(Value::mapping(out, value.location().clone()))
        }
        Schema::Object(fields) => {
            let Ok(entries) = value.as_mapping() else {
                return mismatch(schema, value, path, diags);
            };
            let mut out = Mapping::with_capacity(entries.len());
            for (key, v) in entries {
                let field_path = path.append_key(key.clone());
                let Some(field) = fields.get(key) else {
                    diags.push(Diagnostic::warning(
                        format!("unknown field: {}", key),
                        field_path,
                        v.location().clone(),
                    ));
                    continue;
                };
                if let Some(v) = normalize_node(field, v, &field_path, diags) {
                    out.insert(key.clone(), v);
                }
            }
            Some(Value::mapping(out, value.location().clone()))
        }
    }
}

fn mismatch(schema: &Schema, value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    error(
        format!("expected {}, found {}", schema, value.kind()),
        value,
        path,
        diags,
    )
}

fn error(summary: String, value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    diags.push(Diagnostic::error(summary, path.clone(), value.location().clone()));
    None
}

fn located(kind: ValueKind, location: &Location) -> Option<Value> {
    Some(Value::new(kind, location.clone()))
}

fn normalize_string(value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    match value.inner() {
        ValueKind::String(_) => Some(value.clone()),
        ValueKind::Bool(_) | ValueKind::Int(_) | ValueKind::Float(_) => {
            located(ValueKind::String(value.to_string()), value.location())
        }
        _ => mismatch(&Schema::String, value, path, diags),
    }
}

fn normalize_bool(value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    match value.inner() {
        ValueKind::Bool(_) => Some(value.clone()),
        ValueKind::String(s) if is_pure_variable_reference(s) => Some(value.clone()),
        ValueKind::String(s) => match s.as_str() {
            "true" => located(ValueKind::Bool(true), value.location()),
            "false" => located(ValueKind::Bool(false), value.location()),
            _ => error(format!("cannot parse {:?} as a boolean", s), value, path, diags),
        },
        _ => mismatch(&Schema::Bool, value, path, diags),
    }
}

fn normalize_int(value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    match value.inner() {
        ValueKind::Int(_) => Some(value.clone()),
        ValueKind::Float(f) => match exact_integer(*f) {
            Some(i) => located(ValueKind::Int(i), value.location()),
            None => error(
                format!("cannot accurately represent {} as integer", f),
                value,
                path,
                diags,
            ),
        },
        ValueKind::String(s) if is_pure_variable_reference(s) => Some(value.clone()),
        ValueKind::String(s) => match s.parse::<i64>() {
            Ok(i) => located(ValueKind::Int(i), value.location()),
            Err(_) => error(format!("cannot parse {:?} as an integer", s), value, path, diags),
        },
        _ => mismatch(&Schema::Int, value, path, diags),
    }
}

fn normalize_float(value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    match value.inner() {
        ValueKind::Float(_) => Some(value.clone()),
        ValueKind::Int(i) => located(ValueKind::Float(*i as f64), value.location()),
        ValueKind::String(s) if is_pure_variable_reference(s) => Some(value.clone()),
        ValueKind::String(s) => match s.parse::<f64>() {
            Ok(f) => located(ValueKind::Float(f), value.location()),
            Err(_) => error(
                format!("cannot parse {:?} as a floating point number", s),
                value,
                path,
                diags,
            ),
        },
        _ => mismatch(&Schema::Float, value, path, diags),
    }
}
