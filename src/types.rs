/// Per-question tracking code, unique within one document.
/// Examples: `c_e5`, `5901`, `T1`
pub type TrackingCode = String;
/// Survey number taken from the root segment.
/// Examples: `002`, `108`
pub type SurveyId = String;
/// Form type taken from the root segment.
/// Examples: `0001`, `0002`
pub type FormType = String;
/// Pre-deduplication row identifier `<survey_id>_<form_type>_<tr_code>`.
/// Example: `002_0001_c_e5`
pub type Uid = String;
/// Post-deduplication row identifier (corpus primary key).
/// Examples: `002_0001_c_e5`, `002_0001_c_e5_(0)`
pub type Uuid = String;
/// Flattened column name derived from an attribute path.
/// Examples: `q_text`, `s0_reporting_period__start`, `i1_text`, `sci_file_name`
pub type ColumnName = String;
/// Rendered scalar cell value.
/// Examples: `Contact details`, `31/12/2015`, `3`
pub type CellValue = String;
/// File name used to label a document in logs and reports.
/// Example: `ex_sel002-ft0001.json`
pub type DocumentName = String;
/// Vocabulary word appearing in an attribute path.
/// Examples: `inclusions`, `row_text`, `note_ID`
pub type VocabularyWord = String;
/// Identifier of a free-standing note object.
/// Examples: `N1`, `12`
pub type NoteId = String;
