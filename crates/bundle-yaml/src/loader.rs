/*
 * loader.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Event-driven YAML loader building located values.
 */

use crate::LoadError;
use crate::scalar::infer_plain_scalar;
use bundle_dyn::{Location, Mapping, Path, Value, ValueKind};
use std::collections::HashMap;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Parse `content`, recording `file` in every node's location.
///
/// Only the first document of a multi-document stream is loaded. Empty
/// input yields a `null` value at `1:1`.
///
/// # Errors
///
/// Fails on malformed YAML, on a key repeated within one mapping, and on
/// a sequence or mapping used as a key.
pub fn load(file: &str, content: &str) -> Result<Value, LoadError> {
    let mut builder = ValueBuilder::new(file, content);
    let mut parser = Parser::new_from_str(content);

    parser
        .load(&mut builder, false)
        .map_err(|err| {
            let (line, column) = builder.lines.position(err.marker().index());
            LoadError::Parse {
                file: file.to_string(),
                message: err.info().to_string(),
                line,
                column,
            }
        })?;

    builder.finish()
}

/// Parse bytes that were physically stored elsewhere, attributing every
/// node to `virtual_path`.
///
/// Relative paths found in the document then resolve against the virtual
/// location rather than wherever the bytes happened to be written.
pub fn load_with_virtual_path(virtual_path: &str, content: &[u8]) -> Result<Value, LoadError> {
    let text = std::str::from_utf8(content).map_err(|err| {
        let valid = String::from_utf8_lossy(&content[..err.valid_up_to()]);
        let lines = LineIndex::new(&valid);
        let (line, column) = lines.position(valid.chars().count());
        LoadError::Parse {
            file: virtual_path.to_string(),
            message: "invalid UTF-8".to_string(),
            line,
            column,
        }
    })?;
    load(virtual_path, text)
}

/// Read and parse a file from disk.
pub fn load_file(path: &std::path::Path) -> Result<Value, LoadError> {
    let file = path.display().to_string();
    let content = std::fs::read(path).map_err(|source| LoadError::Io {
        file: file.clone(),
        source,
    })?;
    load_with_virtual_path(&file, &content)
}

/// Read `physical` from disk but attribute its nodes to `virtual_path`.
pub fn load_file_as(physical: &std::path::Path, virtual_path: &str) -> Result<Value, LoadError> {
    let content = std::fs::read(physical).map_err(|source| LoadError::Io {
        file: physical.display().to_string(),
        source,
    })?;
    load_with_virtual_path(virtual_path, &content)
}

/// Maps character offsets to 1-based line and column numbers.
struct LineIndex {
    /// Character offset at which each line starts
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        let mut starts = vec![0];
        for (offset, c) in content.chars().enumerate() {
            if c == '\n' {
                starts.push(offset + 1);
            }
        }
        Self { starts }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= offset);
        let column = offset - self.starts[line - 1] + 1;
        (line, column)
    }
}

/// A collection under construction.
enum Frame {
    Sequence {
        location: Location,
        anchor: usize,
        items: Vec<Value>,
    },
    Mapping {
        location: Location,
        anchor: usize,
        entries: Mapping,
        key_locations: HashMap<String, Location>,
        pending_key: Option<(String, Location)>,
    },
}

struct ValueBuilder {
    file: String,
    lines: LineIndex,
    stack: Vec<Frame>,
    anchors: HashMap<usize, Value>,
    root: Option<Value>,
    documents: usize,
    error: Option<LoadError>,
}

impl ValueBuilder {
    fn new(file: &str, content: &str) -> Self {
        Self {
            file: file.to_string(),
            lines: LineIndex::new(content),
            stack: Vec::new(),
            anchors: HashMap::new(),
            root: None,
            documents: 0,
            error: None,
        }
    }

    fn finish(self) -> Result<Value, LoadError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(self
            .root
            .unwrap_or_else(|| Value::null(Location::new(self.file, 1, 1))))
    }

    fn location(&self, marker: &Marker) -> Location {
        let (line, column) = self.lines.position(marker.index());
        Location::new(self.file.clone(), line, column)
    }

    /// Path of the collection on top of the stack.
    fn current_path(&self) -> Path {
        let mut path = Path::root();
        let parents = self.stack.len().saturating_sub(1);
        for frame in &self.stack[..parents] {
            path = match frame {
                Frame::Sequence { items, .. } => path.append_index(items.len()),
                Frame::Mapping { pending_key, .. } => match pending_key {
                    Some((key, _)) => path.append_key(key.clone()),
                    None => path,
                },
            };
        }
        path
    }

    fn expects_key(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame::Mapping {
                pending_key: None,
                ..
            })
        )
    }

    fn register_anchor(&mut self, anchor: usize, value: &Value) {
        if anchor > 0 {
            self.anchors.insert(anchor, value.clone());
        }
    }

    /// Attach a finished node to its parent, or make it the root.
    fn push_complete(&mut self, value: Value) {
        let Some(parent) = self.stack.last_mut() else {
            self.root = Some(value);
            return;
        };
        match parent {
            Frame::Sequence { items, .. } => items.push(value),
            Frame::Mapping {
                entries,
                pending_key,
                ..
            } => {
                if let Some((key, _)) = pending_key.take() {
                    entries.insert(key, value);
                }
            }
        }
    }

    /// Record a scalar in key position.
    fn push_key(&mut self, key: String, location: Location) {
        let path = self.current_path();
        let Some(Frame::Mapping {
            key_locations,
            pending_key,
            ..
        }) = self.stack.last_mut()
        else {
            return;
        };
        if let Some(first) = key_locations.get(&key) {
            self.error = Some(LoadError::DuplicateKey {
                path,
                key,
                first: first.clone(),
                second: location,
            });
            return;
        }
        key_locations.insert(key.clone(), location.clone());
        *pending_key = Some((key, location));
    }

    fn on_scalar(
        &mut self,
        value: String,
        style: TScalarStyle,
        anchor: usize,
        is_str_tag: bool,
        location: Location,
    ) {
        if self.expects_key() {
            self.push_key(value, location);
            return;
        }
        let kind = if style == TScalarStyle::Plain && !is_str_tag {
            infer_plain_scalar(&value)
        } else {
            ValueKind::String(value)
        };
        let node = Value::new(kind, location);
        self.register_anchor(anchor, &node);
        self.push_complete(node);
    }

    fn on_alias(&mut self, anchor: usize, location: Location) {
        let Some(target) = self.anchors.get(&anchor).cloned() else {
            self.error = Some(LoadError::Parse {
                file: self.file.clone(),
                message: "unknown anchor".to_string(),
                line: location.line,
                column: location.column,
            });
            return;
        };
        if self.expects_key() {
            if target.is_scalar() {
                self.push_key(target.to_string(), location);
            } else {
                self.error = Some(LoadError::NonStringKey { location });
            }
            return;
        }
        self.push_complete(target);
    }

    fn on_collection_start(&mut self, frame: Frame, location: Location) {
        if self.expects_key() {
            self.error = Some(LoadError::NonStringKey { location });
            return;
        }
        self.stack.push(frame);
    }

    fn on_collection_end(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let (value, anchor) = match frame {
            Frame::Sequence {
                location,
                anchor,
                items,
            } => (Value::sequence(items, location), anchor),
            Frame::Mapping {
                location,
                anchor,
                entries,
                ..
            } => (Value::mapping(entries, location), anchor),
        };
        self.register_anchor(anchor, &value);
        self.push_complete(value);
    }
}

impl MarkedEventReceiver for ValueBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        // After an error, or once the first document is complete, the rest
        // of the stream is ignored.
        if self.error.is_some() || self.documents > 1 {
            return;
        }

        match ev {
            Event::Nothing | Event::StreamStart | Event::StreamEnd | Event::DocumentEnd => {}

            Event::DocumentStart => {
                self.documents += 1;
            }

            Event::Scalar(value, style, anchor, tag) => {
                let is_str_tag = tag.is_some_and(|t| t.suffix == "str");
                let location = self.location(&marker);
                self.on_scalar(value, style, anchor, is_str_tag, location);
            }

            Event::SequenceStart(anchor, _tag) => {
                let location = self.location(&marker);
                let frame = Frame::Sequence {
                    location: location.clone(),
                    anchor,
                    items: Vec::new(),
                };
                self.on_collection_start(frame, location);
            }

            Event::MappingStart(anchor, _tag) => {
                let location = self.location(&marker);
                let frame = Frame::Mapping {
                    location: location.clone(),
                    anchor,
                    entries: Mapping::new(),
                    key_locations: HashMap::new(),
                    pending_key: None,
                };
                self.on_collection_start(frame, location);
            }

            Event::SequenceEnd | Event::MappingEnd => self.on_collection_end(),

            Event::Alias(anchor) => {
                let location = self.location(&marker);
                self.on_alias(anchor, location);
            }
        }
    }
}
