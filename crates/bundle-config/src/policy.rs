/*
 * policy.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Which changes an override may make, relative to a collection root.
 */

use crate::{Change, MergeError, OverrideVisitor};
use bundle_dyn::{Path, Value};

/// The visitors used by the mutation phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverridePolicy {
    /// Every change is accepted; the overlay wins.
    Unconditional,

    /// Only new entries directly under `root` may be added. Nothing may be
    /// removed or modified, including adding fields to existing entries.
    AppendOnly { root: Path },

    /// Anything under `root` may change, except that an entry directly
    /// under `root` may not be removed. Nothing outside `root` may change.
    Amend { root: Path },
}

impl OverridePolicy {
    /// Check a change without producing the resulting value.
    pub fn check(&self, path: &Path, change: Change) -> Result<(), MergeError> {
        let allowed = match self {
            OverridePolicy::Unconditional => true,
            OverridePolicy::AppendOnly { root } => {
                change == Change::Insert && is_entry(path, root)
            }
            OverridePolicy::Amend { root } => match change {
                Change::Insert | Change::Update => path.has_prefix(root),
                Change::Delete => path.has_prefix(root) && !is_entry(path, root),
            },
        };

        if allowed {
            tracing::debug!(path = %path, change = %change, "accepting change");
            Ok(())
        } else {
            Err(MergeError::Violation {
                path: path.clone(),
                change,
            })
        }
    }
}

impl OverridePolicy {
    /// [`check`](OverridePolicy::check) for a change that replaces or
    /// removes `old`. Replacing or removing the collection itself, or any
    /// ancestor of it, is rejected while it still holds entries.
    pub fn check_existing(&self, path: &Path, change: Change, old: &Value) -> Result<(), MergeError> {
        if let OverridePolicy::AppendOnly { root } | OverridePolicy::Amend { root } = self
            && root.has_prefix(path)
            && holds_entries(old, path, root)
        {
            return Err(MergeError::Violation {
                path: path.clone(),
                change,
            });
        }
        self.check(path, change)
    }
}

/// True if the collection at `root`, seen from `old` at `path`, is a
/// non-empty mapping.
fn holds_entries(old: &Value, path: &Path, root: &Path) -> bool {
    let rest = Path::new(root.components()[path.len()..].to_vec());
    old.get_by_path(&rest)
        .and_then(Value::as_mapping)
        .is_ok_and(|entries| !entries.is_empty())
}

/// True for a path naming one entry directly below `root`.
fn is_entry(path: &Path, root: &Path) -> bool {
    path.has_prefix(root) && path.len() == root.len() + 1
}

impl OverrideVisitor for OverridePolicy {
    fn on_insert(&self, path: &Path, new: &Value) -> Result<Value, MergeError> {
        self.check(path, Change::Insert)?;
        Ok(new.clone())
    }

    fn on_update(&self, path: &Path, old: &Value, new: &Value) -> Result<Value, MergeError> {
        self.check_existing(path, Change::Update, old)?;
        Ok(new.clone())
    }

    fn on_delete(&self, path: &Path, old: &Value) -> Result<(), MergeError> {
        self.check_existing(path, Change::Delete, old)
    }
}
