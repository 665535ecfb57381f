//! Record builder: one flattened row per traversal unit.
//!
//! Attributes are first keyed by scope (see [`crate::columns`]) and joined per
//! key, then the identity, period, and composite text fields are derived from
//! those keyed values.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::columns::{ColumnKey, ColumnScope, column_keys, segment_depth};
use crate::constants::columns::{
    ALL_CONTEXT, ALL_EXCLUSIONS, ALL_INCLUSIONS, ALL_SEG_TEXT, ALL_TEXT, CLOSE_SEG_TEXT,
    FIRST_TEXT, FORM_TYPE, NOTES, PATH, PERIOD_DAYS, PERIOD_END, PERIOD_START, QTEXT, SUFF_QTEXT,
    SURVEY_ID, SURVEY_NAME, TR_CODE, TYPE, UID,
};
use crate::constants::derivation::{
    CLOSE_SEGMENTS, MAX_RELATIVE_DEPTH, PERIOD_END_SUFFIX, PERIOD_START_SUFFIX, SUFFICIENT_TOKENS,
};
use crate::constants::json_keys::{
    FORM_TYPE as FORM_TYPE_KEY, NOTE_ID_KEYS, NOTE_REFERENCE, NOTE_TEXT, SURVEY_NUMBER,
};
use crate::constants::separators::NOTES_SEP;
use crate::dates::period_days;
use crate::node::{Attr, NoteUnit, PathWord, TraversalUnit, path_to_string, render_scalar};
use crate::problems::{Problem, ProblemKind, Staged};
use crate::status::SurveyNames;
use crate::types::{CellValue, ColumnName, FormType, NoteId, SurveyId, TrackingCode, Uid};
use crate::utils::{join_major, join_minor, non_empty, word_count};

/// Attribute values keyed by scoped column key, joined per key.
pub type KeyedAttrs = BTreeMap<ColumnKey, CellValue>;

/// One flattened question (or exploded matrix cell).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub uid: Uid,
    pub survey_id: Option<SurveyId>,
    pub survey_name: Option<String>,
    pub form_type: Option<FormType>,
    pub tr_code: TrackingCode,
    #[serde(rename = "type")]
    pub question_type: Option<String>,
    pub period_days: Option<i64>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub qtext: String,
    pub suff_qtext: String,
    pub first_text: Option<String>,
    pub close_seg_text: String,
    pub all_seg_text: String,
    pub all_text: String,
    pub all_context: String,
    pub all_inclusions: String,
    pub all_exclusions: String,
    /// Texts of the notes referenced by the unit's attributes.
    pub notes: String,
    /// Unit path joined with `__`.
    pub path: String,
    /// Raw scoped columns (`q_text`, `s0_survey_number`, `i1_text`, ...).
    pub attributes: BTreeMap<ColumnName, CellValue>,
}

impl Record {
    /// Cell text for a published or raw column name.
    pub fn cell(&self, column: &str) -> Option<String> {
        let text = |value: &str| Some(value.to_string());
        match column {
            UID => text(&self.uid),
            SURVEY_ID => self.survey_id.clone(),
            SURVEY_NAME => self.survey_name.clone(),
            FORM_TYPE => self.form_type.clone(),
            TR_CODE => text(&self.tr_code),
            TYPE => self.question_type.clone(),
            PERIOD_DAYS => self.period_days.map(|days| days.to_string()),
            PERIOD_START => self.period_start.clone(),
            PERIOD_END => self.period_end.clone(),
            QTEXT => text(&self.qtext),
            SUFF_QTEXT => text(&self.suff_qtext),
            FIRST_TEXT => self.first_text.clone(),
            CLOSE_SEG_TEXT => text(&self.close_seg_text),
            ALL_SEG_TEXT => text(&self.all_seg_text),
            ALL_TEXT => text(&self.all_text),
            ALL_CONTEXT => text(&self.all_context),
            ALL_INCLUSIONS => text(&self.all_inclusions),
            ALL_EXCLUSIONS => text(&self.all_exclusions),
            NOTES => text(&self.notes),
            PATH => text(&self.path),
            raw => self.attributes.get(raw).cloned(),
        }
    }

    /// Names of the raw scoped columns this record carries.
    pub fn raw_columns(&self) -> impl Iterator<Item = &ColumnName> {
        self.attributes.keys()
    }
}

/// Note texts of one document, keyed by note id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteTexts {
    texts: HashMap<NoteId, String>,
}

impl NoteTexts {
    /// Index the `text` leaves of every note. A note without one contributes
    /// its other leaf values instead.
    pub fn from_notes(notes: &[NoteUnit]) -> Self {
        let mut texts: HashMap<NoteId, Vec<String>> = HashMap::new();
        for note in notes {
            let mut values: Vec<String> = note
                .attrs
                .iter()
                .filter(|attr| last_key_is(attr, NOTE_TEXT))
                .filter_map(|attr| render_scalar(&attr.value))
                .collect();
            if values.is_empty() {
                values = note
                    .attrs
                    .iter()
                    .filter(|attr| !NOTE_ID_KEYS.iter().any(|key| last_key_is(attr, key)))
                    .filter_map(|attr| render_scalar(&attr.value))
                    .collect();
            }
            texts.entry(note.note_id.clone()).or_default().extend(values);
        }
        Self {
            texts: texts
                .into_iter()
                .filter_map(|(id, values)| non_empty(join_minor(values)).map(|text| (id, text)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn get(&self, note_id: &str) -> Option<&str> {
        self.texts.get(note_id).map(String::as_str)
    }

    /// Texts of the notes `unit` references through `note_ID` attributes,
    /// in reference order, each note once. Unknown ids are ignored.
    pub fn for_unit(&self, unit: &TraversalUnit) -> String {
        let mut referenced: Vec<String> = Vec::new();
        for attr in &unit.attrs {
            if !last_key_is(attr, NOTE_REFERENCE) {
                continue;
            }
            if let Some(id) = render_scalar(&attr.value)
                && !referenced.contains(&id)
            {
                referenced.push(id);
            }
        }
        referenced
            .iter()
            .filter_map(|id| self.get(id))
            .collect::<Vec<_>>()
            .join(NOTES_SEP)
    }
}

/// Whether the last key word of `attr`'s path (list indices skipped) is `key`.
fn last_key_is(attr: &Attr, key: &str) -> bool {
    attr.path
        .iter()
        .rev()
        .find_map(PathWord::as_key)
        .is_some_and(|word| word.eq_ignore_ascii_case(key))
}

/// Key every attribute of `unit` and join values sharing a key, in attribute order.
/// `null` values are skipped.
pub fn extract_useful_attrs(unit: &TraversalUnit) -> KeyedAttrs {
    let question_depth = unit
        .attrs
        .iter()
        .map(|attr| segment_depth(&attr.path))
        .chain(std::iter::once(segment_depth(&unit.path)))
        .max()
        .unwrap_or(0);

    let mut grouped: BTreeMap<ColumnKey, Vec<String>> = BTreeMap::new();
    for attr in &unit.attrs {
        let Some(value) = render_scalar(&attr.value) else {
            continue;
        };
        for key in column_keys(&attr.path, question_depth) {
            grouped.entry(key).or_default().push(value.clone());
        }
    }
    grouped
        .into_iter()
        .map(|(key, values)| (key, join_minor(values)))
        .collect()
}

/// Read-only view used while deriving fields.
struct Derivation<'a> {
    attrs: &'a KeyedAttrs,
}

impl<'a> Derivation<'a> {
    fn get(&self, key: &ColumnKey) -> Option<&'a str> {
        self.attrs.get(key).map(String::as_str)
    }

    fn root(&self, suffix: &str) -> Option<String> {
        self.get(&ColumnKey::segment(0, suffix)).map(str::to_string)
    }

    fn relative_text(&self, distance: usize) -> Option<&'a str> {
        self.get(&ColumnKey::relative(distance, "text"))
    }

    fn question_type(&self) -> Option<String> {
        ["type", "col_type", "row_type"]
            .into_iter()
            .map(ColumnKey::question)
            .chain((0..MAX_RELATIVE_DEPTH).map(|distance| ColumnKey::relative(distance, "type")))
            .find_map(|key| self.get(&key))
            .map(str::to_string)
    }

    fn qtext(&self) -> String {
        join_minor(self.attrs.iter().filter_map(|(key, value)| {
            let direct = key.scope == ColumnScope::Question
                && matches!(key.suffix.as_str(), "text" | "row_text" | "col_text");
            direct.then_some(value.as_str())
        }))
    }

    fn first_text(&self, qtext: &str) -> Option<String> {
        non_empty(qtext.to_string()).or_else(|| {
            (0..MAX_RELATIVE_DEPTH)
                .find_map(|distance| self.relative_text(distance))
                .map(str::to_string)
        })
    }

    /// Prepend ancestor texts, nearest first, until the running text has more
    /// than [`SUFFICIENT_TOKENS`] words or the next ancestor has no text.
    fn suff_qtext(&self, qtext: &str) -> String {
        let mut pieces: Vec<&str> = Vec::new();
        let mut tokens = 0;
        if !qtext.is_empty() {
            pieces.push(qtext);
            tokens = word_count(qtext);
        }
        let mut distance = 0;
        while tokens <= SUFFICIENT_TOKENS {
            let Some(text) = self.relative_text(distance) else {
                break;
            };
            if !text.is_empty() {
                pieces.push(text);
                tokens += word_count(text);
            }
            distance += 1;
        }
        join_major(pieces.into_iter().rev())
    }

    fn close_seg_text(&self) -> String {
        let texts: Vec<&str> = (0..CLOSE_SEGMENTS)
            .filter_map(|distance| self.relative_text(distance))
            .collect();
        join_major(texts.into_iter().rev())
    }

    /// Every segment value for `field`, top-down, then every question value.
    fn all_values(&self, field: &str, include_question: bool) -> String {
        join_major(self.attrs.iter().filter_map(|(key, value)| {
            let scoped = match key.scope {
                ColumnScope::Segment(_) => true,
                ColumnScope::Question => include_question,
                ColumnScope::Relative(_) | ColumnScope::ScrapeInfo => false,
            };
            (scoped && key.matches_field(field)).then_some(value.as_str())
        }))
    }
}

/// Build the record for one traversal unit.
pub fn build_record(
    unit: &TraversalUnit,
    notes: &NoteTexts,
    survey_names: &SurveyNames,
) -> Record {
    let keyed = extract_useful_attrs(unit);
    let derive = Derivation { attrs: &keyed };

    let tr_code = unit.tracking_code();
    let survey_id = derive.root(SURVEY_NUMBER);
    let form_type = derive.root(FORM_TYPE_KEY);
    let period_start = derive.root(PERIOD_START_SUFFIX);
    let period_end = derive.root(PERIOD_END_SUFFIX);
    let qtext = derive.qtext();

    let uid = format!(
        "{}_{}_{}",
        survey_id.as_deref().unwrap_or_default(),
        form_type.as_deref().unwrap_or_default(),
        tr_code
    );

    Record {
        uid,
        survey_name: survey_id.as_deref().and_then(|id| survey_names.lookup(id)),
        question_type: derive.question_type(),
        period_days: period_days(period_start.as_deref(), period_end.as_deref()),
        suff_qtext: derive.suff_qtext(&qtext),
        first_text: derive.first_text(&qtext),
        close_seg_text: derive.close_seg_text(),
        all_seg_text: derive.all_values("text", false),
        all_text: derive.all_values("text", true),
        all_context: derive.all_values("context", true),
        all_inclusions: derive.all_values("inclusions", true),
        all_exclusions: derive.all_values("exclusions", true),
        notes: notes.for_unit(unit),
        path: path_to_string(&unit.path),
        attributes: keyed
            .iter()
            .map(|(key, value)| (key.name(), value.clone()))
            .collect(),
        survey_id,
        form_type,
        tr_code,
        period_start,
        period_end,
        qtext,
    }
}

/// Build every record of a document and attach document-level diagnostics.
pub fn build_records(
    document: &str,
    units: &[TraversalUnit],
    notes: &NoteTexts,
    survey_names: &SurveyNames,
) -> Staged<Vec<Record>> {
    let records: Vec<Record> = units
        .iter()
        .map(|unit| build_record(unit, notes, survey_names))
        .collect();
    debug!(document, records = records.len(), "built records");

    let mut problems = Vec::new();
    if records.is_empty() {
        problems.push(Problem::flag(ProblemKind::NoData));
        return Staged::with_problems(records, problems);
    }
    if records.iter().all(|record| record.period_days.is_none()) {
        problems.push(Problem::flag(ProblemKind::ReportingPeriod));
    }
    if records.iter().all(|record| record.form_type.is_none()) {
        problems.push(Problem::flag(ProblemKind::FormType));
    }
    Staged::with_problems(records, problems)
}
