//! Recursive descent over (corrected, exploded) survey documents.
//!
//! Only array indices and the `segment`/`question` keys are traversable. Every
//! other key belongs to the node that holds it: its leaves, and the leaves of any
//! non-traversable subtree beneath it, are that node's attributes.
//!
//! ```text
//! node: {
//!     "question": ...,           traversed, not an attribute
//!     "inclusions": ["a", "b"],  attributes inclusions/0 and inclusions/1
//!     "options": {"note_ID": 3}  attribute options/note_ID
//! }
//! ```

use serde_json::Value;

use crate::constants::json_keys::{NOTE_ID_KEYS, NOTES, QUESTION, SEGMENT, TRACKING_CODE};
use crate::node::{Attr, NodeKind, NodePath, NoteUnit, PathWord, TraversalUnit, render_scalar};

/// Array indices and the structural keys are descended into by the traverser.
pub fn should_be_traversed(word: &PathWord) -> bool {
    match word {
        PathWord::Index(_) => true,
        PathWord::Key(key) => key == SEGMENT || key == QUESTION,
    }
}

fn is_notes(word: &PathWord) -> bool {
    word.is_key(NOTES)
}

/// Attributes owned by `node`: leaves and non-traversable subtrees, never
/// descending into traversable children.
pub fn node_attrs(node: &Value, prefix: &[PathWord]) -> Vec<Attr> {
    let mut attrs = Vec::new();
    collect_node_attrs(node, prefix, &mut attrs);
    attrs
}

fn collect_node_attrs(node: &Value, prefix: &[PathWord], attrs: &mut Vec<Attr>) {
    for (word, child) in NodeKind::of(node).children() {
        if is_notes(&word) {
            continue;
        }
        let child_kind = NodeKind::of(child);
        if child_kind.is_leaf() {
            attrs.push(Attr::new(extend(prefix, word), child.clone()));
        } else if !should_be_traversed(&word) {
            collect_node_attrs(child, &extend(prefix, word), attrs);
        }
    }
}

/// Emit one unit per `tracking_code` key reachable through traversable keys.
///
/// Each unit carries the attributes of the root, of every traversable ancestor,
/// and of the node holding the tracking code, in root-first order.
pub fn traverse(root: &Value) -> Vec<TraversalUnit> {
    let mut units = Vec::new();
    traverse_into(root, &[], &[], &mut units);
    units
}

fn traverse_into(
    node: &Value,
    prefix: &[PathWord],
    inherited: &[Attr],
    units: &mut Vec<TraversalUnit>,
) {
    let kind = NodeKind::of(node);
    if kind.is_leaf() {
        return;
    }
    let mut scope = inherited.to_vec();
    scope.extend(node_attrs(node, prefix));

    for (word, child) in kind.children() {
        if is_notes(&word) {
            continue;
        }
        if should_be_traversed(&word) {
            traverse_into(child, &extend(prefix, word), &scope, units);
        } else if word.is_key(TRACKING_CODE) {
            units.push(TraversalUnit {
                path: extend(prefix, word),
                value: child.clone(),
                attrs: scope.clone(),
            });
        }
    }
}

/// Collect note objects: any object with an `id` or `note_id` key (any case).
/// Nested objects inside a note are part of that note, not separate notes.
pub fn traverse_notes(node: &Value) -> Vec<NoteUnit> {
    let mut notes = Vec::new();
    collect_notes(node, &mut notes);
    notes
}

/// Notes under the document's root `notes` key, if any.
pub fn document_notes(root: &Value) -> Vec<NoteUnit> {
    root.get(NOTES).map(traverse_notes).unwrap_or_default()
}

fn collect_notes(node: &Value, notes: &mut Vec<NoteUnit>) {
    if let Some(map) = node.as_object()
        && let Some(note_id) = note_id_of(map)
    {
        notes.push(NoteUnit {
            note_id,
            attrs: all_leaves(node, &[]),
        });
        return;
    }
    for (_, child) in NodeKind::of(node).children() {
        collect_notes(child, notes);
    }
}

fn note_id_of(map: &serde_json::Map<String, Value>) -> Option<String> {
    // Lower-cased keys; a later duplicate wins, `note_id` beats `id`.
    NOTE_ID_KEYS.iter().find_map(|wanted| {
        map.iter()
            .filter(|(key, _)| key.to_lowercase() == *wanted)
            .last()
            .map(|(_, value)| render_scalar(value).unwrap_or_default())
    })
}

fn all_leaves(node: &Value, prefix: &[PathWord]) -> Vec<Attr> {
    let mut leaves = Vec::new();
    for (word, child) in NodeKind::of(node).children() {
        let path = extend(prefix, word);
        if NodeKind::of(child).is_leaf() {
            leaves.push(Attr::new(path, child.clone()));
        } else {
            leaves.extend(all_leaves(child, &path));
        }
    }
    leaves
}

fn extend(prefix: &[PathWord], word: PathWord) -> NodePath {
    let mut path = Vec::with_capacity(prefix.len() + 1);
    path.extend_from_slice(prefix);
    path.push(word);
    path
}
