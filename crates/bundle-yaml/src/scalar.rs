/*
 * scalar.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Type inference for plain scalars (YAML 1.2 core schema).
 */

use bundle_dyn::ValueKind;

/// Resolve the type of a plain (unquoted, untagged) scalar.
pub(crate) fn infer_plain_scalar(value: &str) -> ValueKind {
    match value {
        "" | "~" | "null" | "Null" | "NULL" => return ValueKind::Null,
        "true" | "True" | "TRUE" => return ValueKind::Bool(true),
        "false" | "False" | "FALSE" => return ValueKind::Bool(false),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => {
            return ValueKind::Float(f64::INFINITY);
        }
        "-.inf" | "-.Inf" | "-.INF" => return ValueKind::Float(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return ValueKind::Float(f64::NAN),
        _ => {}
    }

    if let Some(i) = parse_int(value) {
        return ValueKind::Int(i);
    }

    if looks_like_float(value)
        && let Ok(f) = value.parse::<f64>()
    {
        return ValueKind::Float(f);
    }

    ValueKind::String(value.to_string())
}

fn parse_int(value: &str) -> Option<i64> {
    if let Some(hex) = value.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(octal) = value.strip_prefix("0o") {
        return i64::from_str_radix(octal, 8).ok();
    }
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse::<i64>().ok()
}

/// Rust's float parser also accepts `inf`, `NaN` and `infinity`; YAML does not.
fn looks_like_float(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}
