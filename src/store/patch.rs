//! Document paths and multi-location patches.

use super::StoreError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::instrument;

const FORBIDDEN: [char; 5] = ['.', '#', '$', '[', ']'];

/// A validated `/`-separated document path.
///
/// The empty path addresses the root of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    /// Parses a path, rejecting empty segments and forbidden characters.
    #[instrument(level = "trace")]
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for seg in trimmed.split('/') {
            if seg.is_empty() {
                return Err(StoreError::invalid_path(format!("Empty segment in '{}'", path)));
            }
            if let Some(c) = seg.chars().find(|c| FORBIDDEN.contains(c) || c.is_control()) {
                return Err(StoreError::invalid_path(format!(
                    "Forbidden character {:?} in '{}'",
                    c, path
                )));
            }
            segments.push(seg.to_string());
        }
        Ok(Self { segments })
    }

    /// The root path.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Returns the path extended by `rel`.
    pub fn join(&self, rel: &DocPath) -> DocPath {
        let mut segments = self.segments.clone();
        segments.extend(rel.segments.iter().cloned());
        DocPath { segments }
    }

    /// Returns the path with one more segment.
    pub fn child(&self, segment: impl Into<String>) -> Result<DocPath, StoreError> {
        let seg = segment.into();
        let rel = DocPath::parse(&seg)?;
        if rel.segments.len() != 1 {
            return Err(StoreError::invalid_path(format!("'{}' is not a single segment", seg)));
        }
        Ok(self.join(&rel))
    }

    /// Path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, if any.
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// True if one path is an ancestor of (or equal to) the other.
    pub fn overlaps(&self, other: &DocPath) -> bool {
        self.segments
            .iter()
            .zip(other.segments.iter())
            .all(|(a, b)| a == b)
    }

    /// Looks up the value at this path inside `root`.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut node = root;
        for seg in &self.segments {
            node = node.as_object()?.get(seg)?;
        }
        if node.is_null() { None } else { Some(node) }
    }

    /// Writes `value` at this path inside `root`; `None` deletes.
    ///
    /// Intermediate objects are created as needed. Nulls are never stored
    /// and objects left empty by a delete are pruned.
    pub fn write(&self, root: &mut Value, value: Option<Value>) {
        let value = value.and_then(strip_nulls);
        write_at(root, &self.segments, value);
    }
}

impl std::fmt::Display for DocPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

fn write_at(node: &mut Value, segments: &[String], value: Option<Value>) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value.unwrap_or(Value::Null);
        return;
    };

    if !node.is_object() {
        if value.is_none() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Some(map) = node.as_object_mut() else {
        return;
    };

    if rest.is_empty() {
        match value {
            Some(v) => {
                map.insert(head.clone(), v);
            }
            None => {
                map.remove(head);
            }
        }
        return;
    }

    let child = map.entry(head.clone()).or_insert(Value::Null);
    write_at(child, rest, value);
    let emptied = match child {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        _ => false,
    };
    if emptied {
        map.remove(head);
    }
}

fn strip_nulls(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| strip_nulls(v).map(|v| (k, v)))
                .collect();
            if map.is_empty() { None } else { Some(Value::Object(map)) }
        }
        other => Some(other),
    }
}

/// A set of writes applied atomically, keyed by path relative to the
/// document being updated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    writes: BTreeMap<String, Option<Value>>,
}

impl Patch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a raw JSON value. A JSON null deletes the field.
    pub fn set(&mut self, path: impl Into<String>, value: Value) -> &mut Self {
        let value = if value.is_null() { None } else { Some(value) };
        self.writes.insert(path.into(), value);
        self
    }

    /// Serialises `value` and sets it.
    pub fn set_json<T: Serialize + ?Sized>(
        &mut self,
        path: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self, StoreError> {
        let value = serde_json::to_value(value)?;
        Ok(self.set(path, value))
    }

    /// Deletes a field.
    pub fn delete(&mut self, path: impl Into<String>) -> &mut Self {
        self.writes.insert(path.into(), None);
        self
    }

    /// Adds every write of `other`, which wins on overlapping paths.
    pub fn merge(&mut self, other: Patch) -> &mut Self {
        self.writes.extend(other.writes);
        self
    }

    /// True if the patch writes nothing.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Number of writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// The value written at `path`, if the patch sets one.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.writes.get(path).and_then(Option::as_ref)
    }

    /// True if the patch deletes `path`.
    pub fn deletes(&self, path: &str) -> bool {
        matches!(self.writes.get(path), Some(None))
    }

    /// Resolves every relative path against `base`.
    ///
    /// Fails without side effects if any path is invalid.
    #[instrument(skip(self), fields(writes = self.writes.len()))]
    pub fn resolve(&self, base: &DocPath) -> Result<Vec<(DocPath, Option<Value>)>, StoreError> {
        self.writes
            .iter()
            .map(|(rel, value)| Ok((base.join(&DocPath::parse(rel)?), value.clone())))
            .collect()
    }

    /// Applies the patch to an in-memory document rooted at `doc`.
    pub fn apply_to(&self, doc: &mut Value) -> Result<(), StoreError> {
        for (path, value) in self.resolve(&DocPath::root())? {
            path.write(doc, value);
        }
        Ok(())
    }
}
