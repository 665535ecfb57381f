//! Matrix (grid) question explosion.
//!
//! A matrix node carries `rows`, `cols`, and `cells`; every cell becomes one
//! question-like object holding the cell's own keys, the matrix node's keys,
//! and the referenced row and column keys behind `row_`/`col_` prefixes.

use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

use crate::constants::json_keys::{CELLS, COL_INDEX, COL_PREFIX, COLS, ROW_INDEX, ROW_PREFIX, ROWS};
use crate::problems::{Problem, ProblemKind, Staged};

/// Failure to explode a single matrix node.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    #[error("matrix node has no '{0}' field")]
    MissingField(&'static str),
    #[error("'{field}' entry {position} is not an object")]
    NotAnObject { field: &'static str, position: usize },
    #[error("'{field}' entry {position} has no '{index_key}'")]
    MissingIndex {
        field: &'static str,
        position: usize,
        index_key: &'static str,
    },
    #[error("cell {position} references unknown {index_key} {index}")]
    UnknownReference {
        position: usize,
        index_key: &'static str,
        index: String,
    },
}

/// Matrix node split into its grid fields and its own attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct MatrixParts {
    pub attrs: Map<String, Value>,
    pub rows: Vec<Value>,
    pub cols: Vec<Value>,
    pub cells: Vec<Value>,
}

/// True for any object carrying a `cells` key.
pub fn is_matrix_node(node: &Value) -> bool {
    node.as_object().is_some_and(|map| map.contains_key(CELLS))
}

/// Split a matrix node, coercing single-object grid fields into one-element lists.
pub fn split_matrix(matrix: &Map<String, Value>) -> Result<Staged<MatrixParts>, MatrixError> {
    let mut problems = Vec::new();
    let mut take_list = |field: &'static str| -> Result<Vec<Value>, MatrixError> {
        match matrix.get(field) {
            None => Err(MatrixError::MissingField(field)),
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(other) => {
                problems.push(Problem::new(
                    ProblemKind::MatrixParsing,
                    format!(
                        "{field} field for matrix node below is {} (should be list)\n{}",
                        shape_name(other),
                        pretty(matrix)
                    ),
                ));
                Ok(vec![other.clone()])
            }
        }
    };
    let cols = take_list(COLS)?;
    let rows = take_list(ROWS)?;
    let cells = take_list(CELLS)?;

    let attrs = matrix
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), ROWS | COLS | CELLS))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Staged::with_problems(
        MatrixParts {
            attrs,
            rows,
            cols,
            cells,
        },
        problems,
    ))
}

/// Combine every cell with the matrix attributes and its row and column.
pub fn join_cells(parts: &MatrixParts) -> Result<Vec<Value>, MatrixError> {
    let rows = index_by(&parts.rows, ROWS, ROW_INDEX)?;
    let cols = index_by(&parts.cols, COLS, COL_INDEX)?;

    let mut exploded = Vec::with_capacity(parts.cells.len());
    for (position, cell) in parts.cells.iter().enumerate() {
        let cell = cell.as_object().ok_or(MatrixError::NotAnObject {
            field: CELLS,
            position,
        })?;
        let row = lookup(cell, &rows, position, ROW_INDEX)?;
        let col = lookup(cell, &cols, position, COL_INDEX)?;

        // Later writers win: matrix attributes, then row, then column.
        let mut record = cell.clone();
        for (key, value) in &parts.attrs {
            record.insert(key.clone(), value.clone());
        }
        merge_prefixed(&mut record, row, ROW_PREFIX, ROW_INDEX);
        merge_prefixed(&mut record, col, COL_PREFIX, COL_INDEX);
        exploded.push(Value::Object(record));
    }
    Ok(exploded)
}

/// Explode one matrix node into its cell records.
pub fn explode_matrix(matrix: &Map<String, Value>) -> Result<Staged<Vec<Value>>, MatrixError> {
    let staged = split_matrix(matrix)?;
    let cells = join_cells(&staged.value)?;
    Ok(Staged::with_problems(cells, staged.problems))
}

/// Return a copy of `root` with every matrix node replaced by its exploded cells.
///
/// A matrix that cannot be exploded becomes an empty object and yields a
/// `MatrixParsing` problem; other matrices are unaffected.
pub fn explode_all_matrices(root: &Value) -> Staged<Value> {
    let mut exploded = root.clone();
    let mut problems = Vec::new();
    explode_in_place(&mut exploded, &mut problems);
    Staged::with_problems(exploded, problems)
}

fn explode_in_place(node: &mut Value, problems: &mut Vec<Problem>) {
    match node {
        Value::Object(map) if map.contains_key(CELLS) => {
            let replacement = match split_matrix(map) {
                Ok(staged) => {
                    let parts = staged.merge_into(problems);
                    match join_cells(&parts) {
                        Ok(cells) => Value::Array(cells),
                        Err(err) => degrade(map, &err, problems),
                    }
                }
                Err(err) => degrade(map, &err, problems),
            };
            *node = replacement;
        }
        Value::Object(map) => {
            for child in map.values_mut() {
                explode_in_place(child, problems);
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                explode_in_place(child, problems);
            }
        }
        _ => {}
    }
}

fn degrade(matrix: &Map<String, Value>, err: &MatrixError, problems: &mut Vec<Problem>) -> Value {
    warn!(error = %err, "dropping unparseable matrix node");
    problems.push(Problem::new(
        ProblemKind::MatrixParsing,
        format!(
            "exception occurred parsing matrix node below: {err}\n{}",
            pretty(matrix)
        ),
    ));
    Value::Object(Map::new())
}

fn index_by<'a>(
    items: &'a [Value],
    field: &'static str,
    index_key: &'static str,
) -> Result<HashMap<String, &'a Map<String, Value>>, MatrixError> {
    let mut indexed = HashMap::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let map = item
            .as_object()
            .ok_or(MatrixError::NotAnObject { field, position })?;
        let index = map.get(index_key).ok_or(MatrixError::MissingIndex {
            field,
            position,
            index_key,
        })?;
        indexed.insert(index_repr(index), map);
    }
    Ok(indexed)
}

fn lookup<'a>(
    cell: &Map<String, Value>,
    indexed: &HashMap<String, &'a Map<String, Value>>,
    position: usize,
    index_key: &'static str,
) -> Result<&'a Map<String, Value>, MatrixError> {
    let index = cell.get(index_key).ok_or(MatrixError::MissingIndex {
        field: CELLS,
        position,
        index_key,
    })?;
    let repr = index_repr(index);
    indexed
        .get(&repr)
        .copied()
        .ok_or(MatrixError::UnknownReference {
            position,
            index_key,
            index: repr,
        })
}

fn merge_prefixed(
    record: &mut Map<String, Value>,
    source: &Map<String, Value>,
    prefix: &str,
    index_key: &str,
) {
    for (key, value) in source {
        if key == index_key {
            continue;
        }
        record.insert(format!("{prefix}{key}"), value.clone());
    }
}

/// JSON text of an index so `1` and `"1"` stay distinct.
fn index_repr(index: &Value) -> String {
    index.to_string()
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "a dictionary",
        Value::Array(_) => "a list",
        Value::String(_) => "a string",
        Value::Number(_) => "a number",
        Value::Bool(_) => "a boolean",
        Value::Null => "null",
    }
}

fn pretty(matrix: &Map<String, Value>) -> String {
    serde_json::to_string_pretty(matrix).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grid(rows: usize, cols: usize) -> Value {
        let rows_json: Vec<Value> = (0..rows)
            .map(|r| json!({"row_index": r, "text": format!("row {r}")}))
            .collect();
        let cols_json: Vec<Value> = (0..cols)
            .map(|c| json!({"col_index": c, "text": format!("col {c}"), "type": "currency"}))
            .collect();
        let mut cells = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                cells.push(json!({"row_index": r, "col_index": c, "tracking_code": format!("{r}{c}")}));
            }
        }
        json!({"text": "grid", "rows": rows_json, "cols": cols_json, "cells": cells})
    }

    #[test]
    fn explosion_yields_one_record_per_cell() {
        let matrix = grid(3, 2);
        let staged = explode_matrix(matrix.as_object().unwrap()).unwrap();
        assert!(staged.problems.is_empty());
        assert_eq!(staged.value.len(), 6);
        for cell in &staged.value {
            let code = cell["tracking_code"].as_str().unwrap();
            let (r, c) = (&code[0..1], &code[1..2]);
            assert_eq!(cell["row_text"], json!(format!("row {r}")));
            assert_eq!(cell["col_text"], json!(format!("col {c}")));
            assert_eq!(cell["col_type"], json!("currency"));
            assert_eq!(cell["text"], json!("grid"));
            assert!(cell.get("row_row_index").is_none());
            assert!(cell.get("col_col_index").is_none());
            assert!(cell.get("rows").is_none());
            assert!(cell.get("cells").is_none());
        }
    }

    #[test]
    fn single_object_fields_are_coerced_with_problem() {
        let matrix = json!({
            "rows": {"row_index": 0, "text": "only row"},
            "cols": [{"col_index": 0, "text": "only col"}],
            "cells": {"row_index": 0, "col_index": 0, "tracking_code": "X"}
        });
        let staged = explode_matrix(matrix.as_object().unwrap()).unwrap();
        assert_eq!(staged.value.len(), 1);
        assert_eq!(staged.value[0]["row_text"], json!("only row"));
        assert_eq!(staged.problems.len(), 2);
        assert!(
            staged
                .problems
                .iter()
                .all(|p| p.kind == ProblemKind::MatrixParsing)
        );
        assert!(staged.problems[0].detail.starts_with("rows field"));
    }

    #[test]
    fn matrix_and_prefixed_keys_overwrite_cell_keys() {
        let matrix = json!({
            "text": "matrix text",
            "rows": [{"row_index": 1, "text": "row text"}],
            "cols": [{"col_index": 1}],
            "cells": [{
                "row_index": 1,
                "col_index": 1,
                "text": "cell text",
                "row_text": "cell row text",
                "tracking_code": "C"
            }]
        });
        let cells = explode_matrix(matrix.as_object().unwrap()).unwrap().value;
        assert_eq!(cells[0]["text"], json!("matrix text"));
        assert_eq!(cells[0]["row_text"], json!("row text"));
        assert_eq!(cells[0]["tracking_code"], json!("C"));
    }

    #[test]
    fn unknown_reference_is_an_error() {
        let matrix = json!({
            "rows": [{"row_index": 0}],
            "cols": [{"col_index": 0}],
            "cells": [{"row_index": 5, "col_index": 0, "tracking_code": "C"}]
        });
        let err = explode_matrix(matrix.as_object().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            MatrixError::UnknownReference {
                index_key: ROW_INDEX,
                ..
            }
        ));
    }

    #[test]
    fn broken_matrix_degrades_without_affecting_siblings() {
        let root = json!({
            "segment": {
                "question": [
                    {"rows": [], "cols": [], "cells": [{"row_index": 9, "col_index": 9}]},
                    grid(2, 2)
                ]
            }
        });
        let staged = explode_all_matrices(&root);
        let questions = staged.value["segment"]["question"].as_array().unwrap();
        assert_eq!(questions[0], json!({}));
        assert_eq!(questions[1].as_array().unwrap().len(), 4);
        assert_eq!(staged.problems.len(), 1);
        assert_eq!(staged.problems[0].kind, ProblemKind::MatrixParsing);
        // input untouched
        assert!(is_matrix_node(&root["segment"]["question"][1]));
    }

    #[test]
    fn missing_grid_field_degrades() {
        let root = json!({"question": {"cells": [], "rows": []}});
        let staged = explode_all_matrices(&root);
        assert_eq!(staged.value["question"], json!({}));
        assert!(staged.problems[0].detail.contains("'cols'"));
    }
}
