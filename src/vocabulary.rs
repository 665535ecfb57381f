//! Path-word vocabulary checks with heuristic repair.
//!
//! Unknown words degrade a single attribute (or, when found in a unit's own
//! path, a single unit); they never fail a document. Every unknown word seen is
//! reported once per document in an `InvalidWords` problem.

use std::collections::{BTreeSet, HashSet};

use crate::constants::json_keys::{COL_PREFIX, ROW_PREFIX};
use crate::constants::vocabulary::{
    END, EXCLUSIONS, EXCLUSIONS_FRAGMENT, FINISH, INCLUSIONS, INCLUSIONS_FRAGMENT,
    MATRIX_VALID_WORDS, VALID_PATH_WORDS,
};
use crate::node::{Attr, NodePath, PathWord, TraversalUnit};
use crate::problems::{Problem, ProblemKind, Staged};
use crate::types::VocabularyWord;

/// Outcome of checking a single path word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WordRepair {
    /// Already in the vocabulary.
    Valid,
    /// Rewritten into a vocabulary word.
    Repaired(VocabularyWord),
    /// Not repairable.
    Invalid,
}

/// Outcome of checking a whole path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathRepair {
    /// Path (possibly rewritten) in which every word is valid. `flagged` lists
    /// the original spellings that needed repair.
    Repaired {
        path: NodePath,
        flagged: Vec<VocabularyWord>,
    },
    /// A word could not be repaired; checking stopped there.
    Invalid { flagged: Vec<VocabularyWord> },
}

impl PathRepair {
    pub fn flagged(&self) -> &[VocabularyWord] {
        match self {
            Self::Repaired { flagged, .. } | Self::Invalid { flagged } => flagged,
        }
    }
}

/// Fixed set of valid path words.
#[derive(Clone, Debug)]
pub struct Vocabulary {
    words: HashSet<VocabularyWord>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

impl Vocabulary {
    /// The survey vocabulary plus `row_`/`col_` variants of the matrix words.
    pub fn standard() -> Self {
        Self::from_words(VALID_PATH_WORDS.iter().copied())
            .with_matrix_words(MATRIX_VALID_WORDS.iter().copied())
    }

    pub fn from_words<I, W>(words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<VocabularyWord>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Add each word behind both the row and column prefix.
    pub fn with_matrix_words<I, W>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref();
            self.words.insert(format!("{ROW_PREFIX}{word}"));
            self.words.insert(format!("{COL_PREFIX}{word}"));
        }
        self
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Array indices are always valid.
    pub fn is_valid(&self, word: &PathWord) -> bool {
        match word {
            PathWord::Index(_) => true,
            PathWord::Key(key) => self.contains(key),
        }
    }

    /// Check one key, attempting the spelling heuristics when it is unknown.
    pub fn repair_word(&self, word: &str) -> WordRepair {
        if self.contains(word) {
            return WordRepair::Valid;
        }
        let (prefix, stem) = split_matrix_prefix(word);
        let rewritten = if stem.contains(INCLUSIONS_FRAGMENT) {
            INCLUSIONS
        } else if stem.contains(EXCLUSIONS_FRAGMENT) {
            EXCLUSIONS
        } else if stem == FINISH {
            END
        } else {
            return WordRepair::Invalid;
        };
        let candidate = format!("{prefix}{rewritten}");
        if self.contains(&candidate) {
            WordRepair::Repaired(candidate)
        } else {
            WordRepair::Invalid
        }
    }

    /// Check a path word by word, stopping at the first unrepairable word.
    pub fn repair_path(&self, path: &[PathWord]) -> PathRepair {
        let mut repaired = Vec::with_capacity(path.len());
        let mut flagged = Vec::new();
        for word in path {
            let PathWord::Key(key) = word else {
                repaired.push(word.clone());
                continue;
            };
            match self.repair_word(key) {
                WordRepair::Valid => repaired.push(word.clone()),
                WordRepair::Repaired(fixed) => {
                    flagged.push(key.clone());
                    repaired.push(PathWord::Key(fixed));
                }
                WordRepair::Invalid => {
                    flagged.push(key.clone());
                    return PathRepair::Invalid { flagged };
                }
            }
        }
        PathRepair::Repaired {
            path: repaired,
            flagged,
        }
    }

    /// Repair every unit path and attribute path, dropping what cannot be repaired.
    pub fn filter_units(&self, units: &[TraversalUnit]) -> Staged<Vec<TraversalUnit>> {
        let mut invalid_words: BTreeSet<VocabularyWord> = BTreeSet::new();
        let mut filtered = Vec::with_capacity(units.len());

        for unit in units {
            let check = self.repair_path(&unit.path);
            invalid_words.extend(check.flagged().iter().cloned());
            let PathRepair::Repaired { path, .. } = check else {
                continue;
            };
            let attrs = unit
                .attrs
                .iter()
                .filter_map(|attr| {
                    let check = self.repair_path(&attr.path);
                    invalid_words.extend(check.flagged().iter().cloned());
                    match check {
                        PathRepair::Repaired { path, .. } => {
                            Some(Attr::new(path, attr.value.clone()))
                        }
                        PathRepair::Invalid { .. } => None,
                    }
                })
                .collect();
            filtered.push(TraversalUnit {
                path,
                value: unit.value.clone(),
                attrs,
            });
        }

        let problems = if invalid_words.is_empty() {
            Vec::new()
        } else {
            vec![Problem::new(
                ProblemKind::InvalidWords,
                invalid_words.into_iter().collect::<Vec<_>>().join(", "),
            )]
        };
        Staged::with_problems(filtered, problems)
    }
}

/// Split a `row_`/`col_` prefix off so repairs keep the matrix variant.
fn split_matrix_prefix(word: &str) -> (&str, &str) {
    for prefix in [ROW_PREFIX, COL_PREFIX] {
        if let Some(stem) = word.strip_prefix(prefix) {
            return (prefix, stem);
        }
    }
    ("", word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(words: &[&str]) -> NodePath {
        words.iter().map(|word| PathWord::from(*word)).collect()
    }

    #[test]
    fn known_words_and_indices_are_valid() {
        let vocab = Vocabulary::standard();
        assert!(vocab.is_valid(&PathWord::Index(12)));
        assert!(vocab.is_valid(&"note_ID".into()));
        assert!(vocab.is_valid(&"row_index".into()));
        assert!(vocab.is_valid(&"col_text".into()));
        assert!(!vocab.is_valid(&"row_count_extra".into()));
        assert!(!vocab.is_valid(&"id".into()));
    }

    #[test]
    fn heuristics_repair_known_misspellings() {
        let vocab = Vocabulary::standard();
        assert_eq!(
            vocab.repair_word("inclusion"),
            WordRepair::Repaired("inclusions".into())
        );
        assert_eq!(
            vocab.repair_word("Exclusions_list"),
            WordRepair::Invalid,
            "fragment matching is case sensitive"
        );
        assert_eq!(
            vocab.repair_word("exclusion"),
            WordRepair::Repaired("exclusions".into())
        );
        assert_eq!(
            vocab.repair_word("finish"),
            WordRepair::Repaired("end".into())
        );
        assert_eq!(
            vocab.repair_word("row_inclusion"),
            WordRepair::Repaired("row_inclusions".into())
        );
        assert_eq!(vocab.repair_word("banana"), WordRepair::Invalid);
        assert_eq!(vocab.repair_word("text"), WordRepair::Valid);
    }

    #[test]
    fn repair_path_stops_at_first_invalid_word() {
        let vocab = Vocabulary::standard();
        let check = vocab.repair_path(&path(&["segment", "banana", "apple"]));
        assert_eq!(
            check,
            PathRepair::Invalid {
                flagged: vec!["banana".into()]
            }
        );
        let fixed = vocab.repair_path(&path(&["segment", "reporting_period", "finish"]));
        assert_eq!(
            fixed,
            PathRepair::Repaired {
                path: path(&["segment", "reporting_period", "end"]),
                flagged: vec!["finish".into()]
            }
        );
    }

    fn attr(words: &[&str], value: &str) -> Attr {
        Attr::new(path(words), json!(value))
    }

    fn unit(unit_path: &[&str], attrs: Vec<Attr>) -> TraversalUnit {
        TraversalUnit {
            path: path(unit_path),
            value: json!("T"),
            attrs,
        }
    }

    #[test]
    fn filter_drops_attributes_and_units_and_reports_once() {
        let vocab = Vocabulary::standard();
        let units = vec![
            unit(
                &["segment", "question", "tracking_code"],
                vec![
                    attr(&["segment", "text"], "S"),
                    attr(&["segment", "banana"], "dropped"),
                    attr(&["segment", "question", "inclusion"], "kept"),
                ],
            ),
            unit(&["segment", "mystery", "tracking_code"], Vec::new()),
        ];
        let staged = vocab.filter_units(&units);
        assert_eq!(staged.value.len(), 1);
        let attrs = &staged.value[0].attrs;
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[1].path, path(&["segment", "question", "inclusions"]));
        assert_eq!(
            staged.problems,
            vec![Problem::new(
                ProblemKind::InvalidWords,
                "banana, inclusion, mystery"
            )]
        );
    }

    #[test]
    fn filtering_is_idempotent() {
        let vocab = Vocabulary::standard();
        let units = vec![unit(
            &["segment", "tracking_code"],
            vec![
                attr(&["segment", "reporting_period", "finish"], "31/12/2015"),
                attr(&["segment", "exclusion"], "x"),
                attr(&["segment", "nonsense"], "y"),
            ],
        )];
        let first = vocab.filter_units(&units);
        assert_eq!(first.problems.len(), 1);
        let second = vocab.filter_units(&first.value);
        assert!(second.problems.is_empty());
        assert_eq!(second.value, first.value);
    }

    #[test]
    fn clean_units_produce_no_problem() {
        let vocab = Vocabulary::standard();
        let units = vec![unit(
            &["segment", "tracking_code"],
            vec![attr(&["segment", "text"], "S")],
        )];
        assert!(vocab.filter_units(&units).problems.is_empty());
    }
}
