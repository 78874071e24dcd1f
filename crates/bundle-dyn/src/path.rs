/*
 * path.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Paths addressing nodes inside a value tree.

use crate::PathError;
use std::fmt;
use std::str::FromStr;

/// A single step in a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathComponent {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

impl PathComponent {
    pub fn key(key: impl Into<String>) -> Self {
        PathComponent::Key(key.into())
    }

    pub fn index(index: usize) -> Self {
        PathComponent::Index(index)
    }
}

/// Path to a node, e.g. `resources.jobs.job0.tasks[0]`.
///
/// Paths are values: [`append`](Path::append) returns a new path and leaves
/// the receiver untouched, so a path can be shared between the recursive
/// calls of a tree walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    components: Vec<PathComponent>,
}

impl Path {
    pub fn new(components: Vec<PathComponent>) -> Self {
        Self { components }
    }

    /// The empty path, addressing the root of a tree.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path made only of mapping keys.
    pub fn from_keys<S: AsRef<str>>(keys: &[S]) -> Self {
        Self {
            components: keys
                .iter()
                .map(|k| PathComponent::Key(k.as_ref().to_string()))
                .collect(),
        }
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn last(&self) -> Option<&PathComponent> {
        self.components.last()
    }

    /// A new path with `component` appended.
    pub fn append(&self, component: PathComponent) -> Path {
        let mut components = Vec::with_capacity(self.components.len() + 1);
        components.extend(self.components.iter().cloned());
        components.push(component);
        Path { components }
    }

    pub fn append_key(&self, key: impl Into<String>) -> Path {
        self.append(PathComponent::Key(key.into()))
    }

    pub fn append_index(&self, index: usize) -> Path {
        self.append(PathComponent::Index(index))
    }

    /// True if `prefix` is equal to this path or an ancestor of it.
    pub fn has_prefix(&self, prefix: &Path) -> bool {
        self.components.len() >= prefix.components.len()
            && self.components[..prefix.components.len()] == prefix.components[..]
    }

    /// The path without its last component; `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        if self.components.is_empty() {
            return None;
        }
        Some(Path {
            components: self.components[..self.components.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            match component {
                PathComponent::Key(key) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", key)?;
                }
                PathComponent::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = Vec::new();
        let mut rest = s;

        while !rest.is_empty() {
            if let Some(after_bracket) = rest.strip_prefix('[') {
                let end = after_bracket
                    .find(']')
                    .ok_or_else(|| PathError::UnclosedBracket { path: s.to_string() })?;
                let raw = &after_bracket[..end];
                let index = raw.parse::<usize>().map_err(|_| PathError::InvalidIndex {
                    path: s.to_string(),
                    index: raw.to_string(),
                })?;
                components.push(PathComponent::Index(index));
                rest = &after_bracket[end + 1..];
            } else {
                let end = rest
                    .find(|c| c == '.' || c == '[' || c == ']')
                    .unwrap_or(rest.len());
                if end == 0 {
                    return Err(PathError::EmptyKey { path: s.to_string() });
                }
                components.push(PathComponent::Key(rest[..end].to_string()));
                rest = &rest[end..];
            }

            // After a component: end of input, an index, or a dot followed by a key.
            match rest.chars().next() {
                None | Some('[') => {}
                Some('.') => {
                    rest = &rest[1..];
                    if rest.is_empty() || rest.starts_with('.') || rest.starts_with('[') {
                        return Err(PathError::EmptyKey { path: s.to_string() });
                    }
                }
                Some(character) => {
                    return Err(PathError::UnexpectedCharacter {
                        path: s.to_string(),
                        character,
                    });
                }
            }
        }

        Ok(Path { components })
    }
}
