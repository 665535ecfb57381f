//! Column keys derived from attribute paths.
//!
//! An attribute is keyed by where it sits relative to the question it belongs to:
//!
//! ```text
//! survey_scrape_info/file_name           -> sci_file_name
//! segment/question/inclusions/0          -> q_inclusions
//! segment/segment/reporting_period/start -> s1_reporting_period__start
//!                                           i0_reporting_period__start
//! ```
//!
//! Segment attributes get two keys: `s<n>` counts from the root segment (`s0`),
//! `i<n>` counts from the segment closest to the question (`i0`).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::json_keys::{QUESTION, SCRAPE_INFO, SEGMENT, TRACKING_CODE};
use crate::constants::separators::PATH_SEP;
use crate::node::PathWord;
use crate::types::ColumnName;

/// Where an attribute sits relative to its question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnScope {
    /// Absolute segment depth, 0 = root segment.
    Segment(usize),
    /// Attached to the question node (or to a matrix cell exploded from it).
    Question,
    /// Distance from the question, 0 = closest enclosing segment.
    Relative(usize),
    /// Root scrape-info object.
    ScrapeInfo,
}

impl ColumnScope {
    fn prefix(&self) -> String {
        match self {
            Self::Segment(depth) => format!("s{depth}"),
            Self::Question => "q".to_string(),
            Self::Relative(distance) => format!("i{distance}"),
            Self::ScrapeInfo => "sci".to_string(),
        }
    }
}

/// A scoped column key; renders as `<prefix>_<suffix>`.
///
/// Ordering follows scope first (segments top-down, then question) and suffix
/// second, which is the order composite `all_*` fields concatenate in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnKey {
    pub scope: ColumnScope,
    pub suffix: String,
}

impl ColumnKey {
    pub fn new(scope: ColumnScope, suffix: impl Into<String>) -> Self {
        Self {
            scope,
            suffix: suffix.into(),
        }
    }

    pub fn question(suffix: impl Into<String>) -> Self {
        Self::new(ColumnScope::Question, suffix)
    }

    pub fn segment(depth: usize, suffix: impl Into<String>) -> Self {
        Self::new(ColumnScope::Segment(depth), suffix)
    }

    pub fn relative(distance: usize, suffix: impl Into<String>) -> Self {
        Self::new(ColumnScope::Relative(distance), suffix)
    }

    /// True when the suffix is `field` or ends with `_field`
    /// (`text`, `row_text`, `options__text` all match `text`).
    pub fn matches_field(&self, field: &str) -> bool {
        self.suffix == field
            || self
                .suffix
                .strip_suffix(field)
                .is_some_and(|head| head.ends_with('_'))
    }

    pub fn name(&self) -> ColumnName {
        self.to_string()
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.scope.prefix(), self.suffix)
    }
}

/// Number of `segment` keys along a path.
pub fn segment_depth(path: &[PathWord]) -> usize {
    path.iter().filter(|word| word.is_key(SEGMENT)).count()
}

/// Column keys for one attribute path of a question nested `question_depth`
/// segments deep. Returns no keys for tracking codes and for root attributes
/// outside every scope.
pub fn column_keys(path: &[PathWord], question_depth: usize) -> Vec<ColumnKey> {
    let words: Vec<String> = path
        .iter()
        .filter_map(PathWord::as_key)
        .map(str::to_lowercase)
        .collect();
    if words.iter().any(|word| word == TRACKING_CODE) {
        return Vec::new();
    }

    let mut keys = Vec::new();
    if let Some(pos) = position(&words, SCRAPE_INFO) {
        keys.push(ColumnKey::new(
            ColumnScope::ScrapeInfo,
            words[pos + 1..].join(PATH_SEP),
        ));
    }
    if let Some(pos) = position(&words, QUESTION) {
        keys.push(ColumnKey::question(words[pos + 1..].join(PATH_SEP)));
        return keys;
    }
    if let Some(last) = words.iter().rposition(|word| word == SEGMENT) {
        let depth = words.iter().filter(|word| *word == SEGMENT).count();
        let suffix = words[last + 1..].join(PATH_SEP);
        keys.push(ColumnKey::segment(depth - 1, suffix.clone()));
        keys.push(ColumnKey::relative(question_depth.saturating_sub(depth), suffix));
    }
    keys
}

fn position(words: &[String], wanted: &str) -> Option<usize> {
    words.iter().position(|word| word == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodePath;

    fn path(words: &[&str]) -> NodePath {
        words
            .iter()
            .map(|word| match word.parse::<usize>() {
                Ok(idx) => PathWord::Index(idx),
                Err(_) => PathWord::from(*word),
            })
            .collect()
    }

    fn names(keys: &[ColumnKey]) -> Vec<String> {
        keys.iter().map(ColumnKey::name).collect()
    }

    #[test]
    fn segment_attributes_get_absolute_and_relative_keys() {
        let keys = column_keys(
            &path(&["segment", "segment", "0", "reporting_period", "start"]),
            3,
        );
        assert_eq!(
            names(&keys),
            vec!["s1_reporting_period__start", "i1_reporting_period__start"]
        );
        let root = column_keys(&path(&["segment", "survey_number"]), 1);
        assert_eq!(names(&root), vec!["s0_survey_number", "i0_survey_number"]);
    }

    #[test]
    fn question_attributes_drop_indices_and_lowercase() {
        let keys = column_keys(
            &path(&["segment", "question", "2", "options", "0", "note_ID"]),
            1,
        );
        assert_eq!(names(&keys), vec!["q_options__note_id"]);
    }

    #[test]
    fn question_wins_over_enclosing_segments() {
        let keys = column_keys(&path(&["segment", "question", "segment", "text"]), 1);
        assert_eq!(names(&keys), vec!["q_segment__text"]);
    }

    #[test]
    fn scrape_info_and_tracking_codes() {
        let keys = column_keys(&path(&["survey_scrape_info", "file_name"]), 1);
        assert_eq!(names(&keys), vec!["sci_file_name"]);
        assert!(column_keys(&path(&["segment", "question", "tracking_code"]), 1).is_empty());
        assert!(column_keys(&path(&["unscoped"]), 1).is_empty());
    }

    #[test]
    fn field_matching_requires_word_boundary() {
        assert!(ColumnKey::question("text").matches_field("text"));
        assert!(ColumnKey::question("row_text").matches_field("text"));
        assert!(ColumnKey::segment(0, "options__text").matches_field("text"));
        assert!(!ColumnKey::segment(0, "context").matches_field("text"));
        assert!(!ColumnKey::segment(0, "subtext").matches_field("text"));
    }

    #[test]
    fn ordering_is_top_down_then_question() {
        let mut keys = vec![
            ColumnKey::question("text"),
            ColumnKey::segment(10, "text"),
            ColumnKey::segment(2, "text"),
            ColumnKey::question("col_text"),
        ];
        keys.sort();
        assert_eq!(names(&keys), vec!["s2_text", "s10_text", "q_col_text", "q_text"]);
    }
}
