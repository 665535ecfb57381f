//! Document node model.
//!
//! Documents stay as `serde_json::Value` trees; traversal dispatches on the closed
//! [`NodeKind`] view instead of probing key presence ad hoc.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::constants::separators::PATH_SEP;
use crate::types::{NoteId, TrackingCode};

/// One step in a path from the document root: an object key or an array index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathWord {
    Index(usize),
    Key(String),
}

impl PathWord {
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// The key text, or `None` for array indices.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key),
            Self::Index(_) => None,
        }
    }

    pub fn is_key(&self, key: &str) -> bool {
        self.as_key() == Some(key)
    }
}

impl fmt::Display for PathWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(idx) => write!(f, "{idx}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

impl From<&str> for PathWord {
    fn from(value: &str) -> Self {
        Self::Key(value.to_string())
    }
}

impl From<usize> for PathWord {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

/// Path from the document root.
pub type NodePath = Vec<PathWord>;

/// Join path words with `__` (e.g. `segment__question__2__tracking_code`).
pub fn path_to_string(path: &[PathWord]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(PATH_SEP)
}

/// A leaf value tagged with its full path from the root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attr {
    pub path: NodePath,
    pub value: Value,
}

impl Attr {
    pub fn new(path: NodePath, value: Value) -> Self {
        Self { path, value }
    }
}

/// Output of the tree traverser: one per `tracking_code` key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraversalUnit {
    /// Path of the `tracking_code` key itself.
    pub path: NodePath,
    /// Raw tracking-code value.
    pub value: Value,
    /// Leaf attributes of every ancestor and of the question node, root first.
    pub attrs: Vec<Attr>,
}

impl TraversalUnit {
    /// Tracking code rendered as text (empty when the value is `null`).
    pub fn tracking_code(&self) -> TrackingCode {
        render_scalar(&self.value).unwrap_or_default()
    }
}

/// A free-standing note object found under the root `notes` subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteUnit {
    pub note_id: NoteId,
    /// Leaf attributes of the note, with paths relative to the note object.
    pub attrs: Vec<Attr>,
}

/// Closed view over the shape of a JSON node.
#[derive(Clone, Copy, Debug)]
pub enum NodeKind<'a> {
    Leaf(&'a Value),
    Array(&'a [Value]),
    Object(&'a Map<String, Value>),
}

impl<'a> NodeKind<'a> {
    pub fn of(node: &'a Value) -> Self {
        match node {
            Value::Array(items) => Self::Array(items),
            Value::Object(map) => Self::Object(map),
            other => Self::Leaf(other),
        }
    }

    /// Containers are never leaves, even when empty.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Children in document order, keyed by index or object key.
    pub fn children(&self) -> Vec<(PathWord, &'a Value)> {
        match self {
            Self::Leaf(_) => Vec::new(),
            Self::Array(items) => items
                .iter()
                .enumerate()
                .map(|(idx, child)| (PathWord::Index(idx), child))
                .collect(),
            Self::Object(map) => map
                .iter()
                .map(|(key, child)| (PathWord::Key(key.clone()), child))
                .collect(),
        }
    }
}

pub fn is_leaf(node: &Value) -> bool {
    NodeKind::of(node).is_leaf()
}

/// Render a leaf as cell text. `null` renders as missing; containers are not scalars.
pub fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
    }
}
