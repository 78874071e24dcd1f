/*
 * merge.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Structural merge used to combine bundle files.
 */

use bundle_dyn::{Value, ValueKind};

/// Merge `overlay` into `base`.
///
/// - mappings merge key by key: base keys keep their order, keys new in the
///   overlay are appended;
/// - sequences concatenate, base items first;
/// - `null` on either side yields the other side;
/// - otherwise the overlay replaces the base.
///
/// Merged mappings and sequences keep the base node's location; every other
/// node keeps the location of the side it came from.
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base.inner(), overlay.inner()) {
        (_, ValueKind::Null) => base.clone(),
        (ValueKind::Null, _) => overlay.clone(),
        (ValueKind::Mapping(left), ValueKind::Mapping(right)) => {
            let mut out = left.clone();
            for (key, value) in right {
                let merged = match left.get(key) {
                    Some(existing) => merge(existing, value),
                    None => value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            Value::mapping(out, base.location().clone())
        }
        (ValueKind::Sequence(left), ValueKind::Sequence(right)) => {
            let items = left.iter().chain(right).cloned().collect();
            Value::sequence(items, base.location().clone())
        }
        _ => overlay.clone(),
    }
}
