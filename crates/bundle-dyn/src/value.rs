/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Location-carrying dynamic values.
 */

use crate::{DynError, Location, Mapping, Path, PathComponent};
use indexmap::IndexMap;
use std::fmt;

/// The kind of a [`Value`], without its payload.
///
/// Used in type mismatch errors and schema diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Sequence,
    Mapping,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Sequence => "sequence",
            Kind::Mapping => "map",
        };
        write!(f, "{}", name)
    }
}

/// Payload of a [`Value`].
///
/// Mappings preserve insertion order and have unique string keys.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

/// A configuration value together with the location it was written at.
///
/// Values are immutable: transformations build new trees, sharing nothing
/// with the input except through clones.
///
/// `PartialEq` compares locations too; use
/// [`eq_ignore_location`](Value::eq_ignore_location) to compare content only.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    kind: ValueKind,
    location: Location,
}

impl Default for Value {
    fn default() -> Self {
        Value::null(Location::default())
    }
}

impl Value {
    pub fn new(kind: ValueKind, location: Location) -> Self {
        Self { kind, location }
    }

    pub fn null(location: Location) -> Self {
        Self::new(ValueKind::Null, location)
    }

    pub fn bool(value: bool, location: Location) -> Self {
        Self::new(ValueKind::Bool(value), location)
    }

    pub fn int(value: i64, location: Location) -> Self {
        Self::new(ValueKind::Int(value), location)
    }

    pub fn float(value: f64, location: Location) -> Self {
        Self::new(ValueKind::Float(value), location)
    }

    pub fn string(value: impl Into<String>, location: Location) -> Self {
        Self::new(ValueKind::String(value.into()), location)
    }

    pub fn sequence(items: Vec<Value>, location: Location) -> Self {
        Self::new(ValueKind::Sequence(items), location)
    }

    pub fn mapping(entries: Mapping, location: Location) -> Self {
        Self::new(ValueKind::Mapping(entries), location)
    }

    /// Convert a plain JSON value, stamping every node with `location`.
    pub fn from_json(json: &serde_json::Value, location: &Location) -> Self {
        let kind = match json {
            serde_json::Value::Null => ValueKind::Null,
            serde_json::Value::Bool(b) => ValueKind::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ValueKind::Int(i),
                None => ValueKind::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => ValueKind::String(s.clone()),
            serde_json::Value::Array(items) => ValueKind::Sequence(
                items.iter().map(|v| Value::from_json(v, location)).collect(),
            ),
            serde_json::Value::Object(entries) => ValueKind::Mapping(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v, location)))
                    .collect(),
            ),
        };
        Value::new(kind, location.clone())
    }

    pub fn inner(&self) -> &ValueKind {
        &self.kind
    }

    pub fn into_inner(self) -> ValueKind {
        self.kind
    }

    pub fn into_parts(self) -> (ValueKind, Location) {
        (self.kind, self.location)
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn kind(&self) -> Kind {
        match &self.kind {
            ValueKind::Null => Kind::Null,
            ValueKind::Bool(_) => Kind::Bool,
            ValueKind::Int(_) => Kind::Int,
            ValueKind::Float(_) => Kind::Float,
            ValueKind::String(_) => Kind::String,
            ValueKind::Sequence(_) => Kind::Sequence,
            ValueKind::Mapping(_) => Kind::Mapping,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.kind, ValueKind::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, ValueKind::Sequence(_))
    }

    pub fn is_scalar(&self) -> bool {
        !self.is_mapping() && !self.is_sequence()
    }

    fn mismatch(&self, expected: Kind) -> DynError {
        DynError::TypeMismatch {
            expected,
            found: self.kind(),
            location: self.location.clone(),
        }
    }

    pub fn as_str(&self) -> Result<&str, DynError> {
        match &self.kind {
            ValueKind::String(s) => Ok(s),
            _ => Err(self.mismatch(Kind::String)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, DynError> {
        match self.kind {
            ValueKind::Bool(b) => Ok(b),
            _ => Err(self.mismatch(Kind::Bool)),
        }
    }

    pub fn as_int(&self) -> Result<i64, DynError> {
        match self.kind {
            ValueKind::Int(i) => Ok(i),
            _ => Err(self.mismatch(Kind::Int)),
        }
    }

    pub fn as_float(&self) -> Result<f64, DynError> {
        match self.kind {
            ValueKind::Float(f) => Ok(f),
            _ => Err(self.mismatch(Kind::Float)),
        }
    }

    pub fn as_sequence(&self) -> Result<&[Value], DynError> {
        match &self.kind {
            ValueKind::Sequence(items) => Ok(items),
            _ => Err(self.mismatch(Kind::Sequence)),
        }
    }

    pub fn as_mapping(&self) -> Result<&Mapping, DynError> {
        match &self.kind {
            ValueKind::Mapping(entries) => Ok(entries),
            _ => Err(self.mismatch(Kind::Mapping)),
        }
    }

    /// Look up a key if this is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match &self.kind {
            ValueKind::Mapping(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Walk `path` from this node.
    ///
    /// Fails with a type mismatch when a component does not fit the node
    /// it is applied to, and with a not-found error when a key or index is
    /// missing.
    pub fn get_by_path(&self, path: &Path) -> Result<&Value, DynError> {
        let mut current = self;
        let mut walked = Path::root();
        for component in path.components() {
            walked = walked.append(component.clone());
            current = match component {
                PathComponent::Key(key) => current
                    .as_mapping()?
                    .get(key)
                    .ok_or_else(|| DynError::KeyNotFound {
                        path: walked.clone(),
                    })?,
                PathComponent::Index(index) => {
                    let items = current.as_sequence()?;
                    items.get(*index).ok_or_else(|| DynError::IndexOutOfBounds {
                        path: walked.clone(),
                        len: items.len(),
                    })?
                }
            };
        }
        Ok(current)
    }

    /// Deep equality of content, ignoring every location in both trees.
    ///
    /// Mapping key order is not significant, matching lookup semantics.
    pub fn eq_ignore_location(&self, other: &Value) -> bool {
        match (&self.kind, &other.kind) {
            (ValueKind::Sequence(a), ValueKind::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignore_location(y))
            }
            (ValueKind::Mapping(a), ValueKind::Mapping(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(k, va)| b.get(k).is_some_and(|vb| va.eq_ignore_location(vb)))
            }
            (a, b) => a == b,
        }
    }

    /// Same content with this node's location replaced. Children keep theirs.
    pub fn with_location(self, location: Location) -> Value {
        Value {
            kind: self.kind,
            location,
        }
    }

    /// Same content with every node in the tree stamped with `location`.
    pub fn with_location_recursive(&self, location: &Location) -> Value {
        let kind = match &self.kind {
            ValueKind::Sequence(items) => ValueKind::Sequence(
                items
                    .iter()
                    .map(|v| v.with_location_recursive(location))
                    .collect(),
            ),
            ValueKind::Mapping(entries) => ValueKind::Mapping(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.with_location_recursive(location)))
                    .collect(),
            ),
            scalar => scalar.clone(),
        };
        Value::new(kind, location.clone())
    }

    /// Same tree with the file of every location replaced by `file`.
    /// Line and column are kept.
    pub fn relocate(&self, file: &str) -> Value {
        let kind = match &self.kind {
            ValueKind::Sequence(items) => {
                ValueKind::Sequence(items.iter().map(|v| v.relocate(file)).collect())
            }
            ValueKind::Mapping(entries) => ValueKind::Mapping(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.relocate(file)))
                    .collect(),
            ),
            scalar => scalar.clone(),
        };
        Value::new(kind, self.location.with_file(file))
    }

    /// Strip locations, producing plain JSON.
    ///
    /// Non-finite floats have no JSON form and become `null`.
    pub fn to_plain(&self) -> serde_json::Value {
        match &self.kind {
            ValueKind::Null => serde_json::Value::Null,
            ValueKind::Bool(b) => serde_json::Value::Bool(*b),
            ValueKind::Int(i) => serde_json::Value::from(*i),
            ValueKind::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ValueKind::String(s) => serde_json::Value::String(s.clone()),
            ValueKind::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_plain).collect())
            }
            ValueKind::Mapping(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_plain()))
                    .collect(),
            ),
        }
    }

    /// Build a mapping from `(key, value)` pairs.
    pub fn mapping_from<I, K>(entries: I, location: Location) -> Value
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let entries: IndexMap<String, Value> =
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::mapping(entries, location)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Null => write!(f, "null"),
            ValueKind::Bool(b) => write!(f, "{}", b),
            ValueKind::Int(i) => write!(f, "{}", i),
            ValueKind::Float(x) => write!(f, "{}", x),
            ValueKind::String(s) => write!(f, "{}", s),
            ValueKind::Sequence(_) | ValueKind::Mapping(_) => write!(f, "{}", self.to_plain()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: usize, column: usize) -> Location {
        Location::new("bundle.yml", line, column)
    }

    fn sample() -> Value {
        let task = Value::mapping_from(
            [("task_key", Value::string("main", loc(5, 19)))],
            loc(5, 9),
        );
        let job = Value::mapping_from(
            [
                ("name", Value::string("nightly", loc(3, 13))),
                ("tasks", Value::sequence(vec![task], loc(5, 7))),
            ],
            loc(3, 7),
        );
        let jobs = Value::mapping_from([("job0", job)], loc(2, 5));
        Value::mapping_from([("jobs", jobs)], loc(1, 1))
    }

    #[test]
    fn test_get_by_path() {
        let root = sample();
        let path: Path = "jobs.job0.tasks[0].task_key".parse().unwrap();
        let node = root.get_by_path(&path).unwrap();
        assert_eq!(node.as_str().unwrap(), "main");
        assert_eq!(node.location(), &loc(5, 19));
    }

    #[test]
    fn test_get_by_path_missing_key() {
        let root = sample();
        let err = root
            .get_by_path(&"jobs.job1.name".parse().unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            DynError::KeyNotFound {
                path: "jobs.job1".parse().unwrap()
            }
        );
    }

    #[test]
    fn test_get_by_path_index_out_of_bounds() {
        let root = sample();
        let err = root
            .get_by_path(&"jobs.job0.tasks[3]".parse().unwrap())
            .unwrap_err();
        assert!(matches!(err, DynError::IndexOutOfBounds { len: 1, .. }));
    }

    #[test]
    fn test_get_by_path_wrong_kind() {
        let root = sample();
        let err = root
            .get_by_path(&"jobs.job0.name[0]".parse().unwrap())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected sequence, found string at bundle.yml:3:13"
        );
    }

    #[test]
    fn test_eq_ignore_location() {
        let a = sample();
        let b = sample().relocate("other.yml");
        assert_ne!(a, b);
        assert!(a.eq_ignore_location(&b));

        let c = Value::mapping_from([("jobs", Value::null(loc(1, 1)))], loc(1, 1));
        assert!(!a.eq_ignore_location(&c));
    }

    #[test]
    fn test_mapping_order_does_not_matter_for_equality() {
        let ab = Value::mapping_from(
            [("a", Value::int(1, loc(1, 1))), ("b", Value::int(2, loc(1, 1)))],
            loc(1, 1),
        );
        let ba = Value::mapping_from(
            [("b", Value::int(2, loc(1, 1))), ("a", Value::int(1, loc(1, 1)))],
            loc(1, 1),
        );
        assert!(ab.eq_ignore_location(&ba));
    }

    #[test]
    fn test_with_location_recursive() {
        let generated = Location::new("__generated__.yml", 0, 0);
        let stamped = sample().with_location_recursive(&generated);
        let node = stamped
            .get_by_path(&"jobs.job0.tasks[0].task_key".parse().unwrap())
            .unwrap();
        assert_eq!(node.location(), &generated);
        assert_eq!(stamped.location(), &generated);
    }

    #[test]
    fn test_relocate_keeps_positions() {
        let moved = sample().relocate("other.yml");
        let node = moved
            .get_by_path(&"jobs.job0.name".parse().unwrap())
            .unwrap();
        assert_eq!(node.location(), &Location::new("other.yml", 3, 13));
    }

    #[test]
    fn test_to_plain_and_from_json() {
        let plain = sample().to_plain();
        assert_eq!(
            plain,
            serde_json::json!({"jobs": {"job0": {"name": "nightly", "tasks": [{"task_key": "main"}]}}})
        );
        let back = Value::from_json(&plain, &Location::default());
        assert!(back.eq_ignore_location(&sample()));
    }

    #[test]
    fn test_non_finite_float_to_plain() {
        assert_eq!(
            Value::float(f64::NAN, Location::default()).to_plain(),
            serde_json::Value::Null
        );
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::float(2.0, Location::default()).to_string(), "2");
        assert_eq!(Value::float(2.5, Location::default()).to_string(), "2.5");
        assert_eq!(Value::string("x", Location::default()).to_string(), "x");
        assert_eq!(Value::null(Location::default()).to_string(), "null");
    }
}
