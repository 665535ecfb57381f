//! Per-document pipeline.
//!
//! ```text
//! bytes -> decode -> normalize -> explode matrices -> traverse -> vocabulary
//!       -> records -> diagnostics
//!                  \-> notes
//! ```
//!
//! Each stage returns its own problems; the pipeline folds them into the
//! document's list in stage order. Nothing is shared between documents.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::constants::json_keys::{FORM_TYPE, SEGMENT, SURVEY_NUMBER};
use crate::errors::CorpusError;
use crate::matrix::explode_all_matrices;
use crate::node::{NoteUnit, path_to_string, render_scalar};
use crate::normalize::correct_top_level_segment;
use crate::problems::{Problem, ProblemKind, Staged};
use crate::record::{NoteTexts, Record, build_records};
use crate::status::SurveyNames;
use crate::transport::fs::{document_name, read_document};
use crate::traverse::{document_notes, traverse};
use crate::types::{DocumentName, FormType, NoteId, SurveyId, VocabularyWord};
use crate::vocabulary::Vocabulary;

/// One attribute of one note, in long format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRow {
    pub survey_id: Option<SurveyId>,
    pub form_type: Option<FormType>,
    pub note_id: NoteId,
    pub attr_path: String,
    pub value: String,
}

/// Everything one document contributes to the corpus.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentOutput {
    pub name: DocumentName,
    pub path: PathBuf,
    pub records: Vec<Record>,
    pub notes: Vec<NoteRow>,
    pub problems: Vec<Problem>,
}

impl DocumentOutput {
    /// Words reported in this document's `InvalidWords` problem, sorted.
    pub fn invalid_words(&self) -> Vec<VocabularyWord> {
        self.problems
            .iter()
            .filter(|problem| problem.kind == ProblemKind::InvalidWords)
            .flat_map(|problem| problem.detail.split(", "))
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Shared, read-only inputs of the per-document pipeline.
#[derive(Clone, Debug, Default)]
pub struct DocumentPipeline {
    vocabulary: Vocabulary,
    survey_names: SurveyNames,
}

impl DocumentPipeline {
    pub fn new(vocabulary: Vocabulary, survey_names: SurveyNames) -> Self {
        Self {
            vocabulary,
            survey_names,
        }
    }

    pub fn with_survey_names(mut self, survey_names: SurveyNames) -> Self {
        self.survey_names = survey_names;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Read one document from disk and run every stage.
    pub fn process_path(&self, path: &Path) -> Result<DocumentOutput, CorpusError> {
        let name = document_name(path);
        let decoded = read_document(path)?;
        let mut output = self.process_document(&name, decoded)?;
        output.path = path.to_path_buf();
        Ok(output)
    }

    /// Run every stage on an already decoded document.
    ///
    /// Fails only when the root structure cannot be corrected; all other
    /// anomalies become problems on the output.
    pub fn process_document(
        &self,
        name: &str,
        decoded: Staged<Value>,
    ) -> Result<DocumentOutput, CorpusError> {
        let mut problems = Vec::new();
        let root = decoded.merge_into(&mut problems);

        let corrected = correct_top_level_segment(name, &root)?.merge_into(&mut problems);
        let exploded = explode_all_matrices(&corrected).merge_into(&mut problems);
        let units = traverse(&exploded);
        debug!(document = name, units = units.len(), "traversed document");

        let units = self
            .vocabulary
            .filter_units(&units)
            .merge_into(&mut problems);
        let note_units = document_notes(&corrected);
        let note_texts = NoteTexts::from_notes(&note_units);
        let records = build_records(name, &units, &note_texts, &self.survey_names)
            .merge_into(&mut problems);

        let notes = note_rows(&corrected, &note_units);
        debug!(
            document = name,
            records = records.len(),
            notes = notes.len(),
            problems = problems.len(),
            "processed document"
        );

        Ok(DocumentOutput {
            name: name.to_string(),
            path: PathBuf::from(name),
            records,
            notes,
            problems,
        })
    }
}

fn root_segment_field(root: &Value, key: &str) -> Option<String> {
    root.get(SEGMENT)?.get(key).and_then(render_scalar)
}

/// Flatten note units into long-format rows tagged with the document identity.
pub fn note_rows(root: &Value, notes: &[NoteUnit]) -> Vec<NoteRow> {
    let survey_id = root_segment_field(root, SURVEY_NUMBER);
    let form_type = root_segment_field(root, FORM_TYPE);
    let mut rows = Vec::new();
    for note in notes {
        for attr in &note.attrs {
            let Some(value) = render_scalar(&attr.value) else {
                continue;
            };
            rows.push(NoteRow {
                survey_id: survey_id.clone(),
                form_type: form_type.clone(),
                note_id: note.note_id.clone(),
                attr_path: path_to_string(&attr.path),
                value,
            });
        }
    }
    rows
}
