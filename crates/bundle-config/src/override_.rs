/*
 * override_.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Replace a document with a new version, one approved change at a time.
 */

use crate::MergeError;
use bundle_dyn::{Mapping, Path, Value, ValueKind};
use std::fmt;

/// The kind of change a visitor is asked to approve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Insert => write!(f, "insert"),
            Change::Update => write!(f, "update"),
            Change::Delete => write!(f, "delete"),
        }
    }
}

/// Decides, node by node, whether [`override_value`] may apply a change.
///
/// `on_insert` and `on_update` return the value to install, normally `new`.
pub trait OverrideVisitor {
    fn on_insert(&self, path: &Path, new: &Value) -> Result<Value, MergeError>;

    fn on_update(&self, path: &Path, old: &Value, new: &Value) -> Result<Value, MergeError>;

    fn on_delete(&self, path: &Path, old: &Value) -> Result<(), MergeError>;
}

/// Replace `base` with `overlay`, consulting `visitor` for every difference.
///
/// Both trees are walked together. A node only in `overlay` is an insert,
/// a node only in `base` is a delete, and a scalar that differs, or a node
/// whose kind changes, is a single update at that node. The first rejected
/// change aborts the whole override; `base` is never modified.
///
/// Unchanged scalars keep the base node, so locations of untouched content
/// survive. Mappings and sequences present on both sides keep the base
/// location; a mapping's keys follow the overlay's order.
pub fn override_value(
    base: &Value,
    overlay: &Value,
    visitor: &dyn OverrideVisitor,
) -> Result<Value, MergeError> {
    override_at(&Path::root(), base, overlay, visitor)
}

fn override_at(
    path: &Path,
    base: &Value,
    overlay: &Value,
    visitor: &dyn OverrideVisitor,
) -> Result<Value, MergeError> {
    if base.kind() != overlay.kind() {
        return visitor.on_update(path, base, overlay);
    }

    match (base.inner(), overlay.inner()) {
        (ValueKind::Mapping(left), ValueKind::Mapping(right)) => {
            let merged = override_mapping(path, left, right, visitor)?;
            Ok(Value::mapping(merged, base.location().clone()))
        }
        (ValueKind::Sequence(left), ValueKind::Sequence(right)) => {
            let merged = override_sequence(path, left, right, visitor)?;
            Ok(Value::sequence(merged, base.location().clone()))
        }
        (ValueKind::Null, ValueKind::Null) => Ok(base.clone()),
        (left, right) if left == right => Ok(base.clone()),
        _ => visitor.on_update(path, base, overlay),
    }
}

fn override_mapping(
    path: &Path,
    left: &Mapping,
    right: &Mapping,
    visitor: &dyn OverrideVisitor,
) -> Result<Mapping, MergeError> {
    for (key, old) in left {
        if !right.contains_key(key) {
            visitor.on_delete(&path.append_key(key.clone()), old)?;
        }
    }

    let mut out = Mapping::with_capacity(right.len());
    for (key, new) in right {
        let child_path = path.append_key(key.clone());
        let value = match left.get(key) {
            Some(old) => override_at(&child_path, old, new, visitor)?,
            None => visitor.on_insert(&child_path, new)?,
        };
        out.insert(key.clone(), value);
    }
    Ok(out)
}

fn override_sequence(
    path: &Path,
    left: &[Value],
    right: &[Value],
    visitor: &dyn OverrideVisitor,
) -> Result<Vec<Value>, MergeError> {
    let common = left.len().min(right.len());
    let mut out = Vec::with_capacity(right.len());

    for i in 0..common {
        out.push(override_at(&path.append_index(i), &left[i], &right[i], visitor)?);
    }
    for (i, new) in right.iter().enumerate().skip(common) {
        out.push(visitor.on_insert(&path.append_index(i), new)?);
    }
    for (i, old) in left.iter().enumerate().skip(common) {
        visitor.on_delete(&path.append_index(i), old)?;
    }
    Ok(out)
}
