/// Structural keys recognised in survey documents.
pub mod json_keys {
    /// Grouping node key; traversable.
    pub const SEGMENT: &str = "segment";
    /// Question node key; traversable.
    pub const QUESTION: &str = "question";
    /// Leaf key whose value identifies a question.
    pub const TRACKING_CODE: &str = "tracking_code";
    /// Root object describing where and when the document was scraped.
    pub const SCRAPE_INFO: &str = "survey_scrape_info";
    /// Subtree of free-standing notes, traversed separately.
    pub const NOTES: &str = "notes";
    /// Discriminator on segment objects.
    pub const SEGMENT_TYPE: &str = "segment_type";
    /// `segment_type` value of the survey (root) segment.
    pub const SURVEY_SEGMENT_TYPE: &str = "survey";
    /// Matrix node field listing grid rows.
    pub const ROWS: &str = "rows";
    /// Matrix node field listing grid columns.
    pub const COLS: &str = "cols";
    /// Matrix node field listing grid cells; its presence marks a matrix node.
    pub const CELLS: &str = "cells";
    /// Row reference carried by rows and cells.
    pub const ROW_INDEX: &str = "row_index";
    /// Column reference carried by columns and cells.
    pub const COL_INDEX: &str = "col_index";
    /// Prefix for row attributes merged into exploded cells.
    pub const ROW_PREFIX: &str = "row_";
    /// Prefix for column attributes merged into exploded cells.
    pub const COL_PREFIX: &str = "col_";
    /// Survey number on the root segment.
    pub const SURVEY_NUMBER: &str = "survey_number";
    /// Form type on the root segment.
    pub const FORM_TYPE: &str = "form_type";
    /// Note identifier keys (compared lower-cased).
    pub const NOTE_ID_KEYS: [&str; 2] = ["note_id", "id"];
    /// Key referencing a note from a question or segment (compared lower-cased).
    pub const NOTE_REFERENCE: &str = "note_id";
    /// Note attribute carrying its text.
    pub const NOTE_TEXT: &str = "text";
}

/// Separators used when joining attribute values into cells.
pub mod separators {
    /// Joins values sharing one column key.
    pub const MINOR_SEP: &str = " | ";
    /// Joins values from different column keys inside a composite field.
    pub const MAJOR_SEP: &str = " ||| ";
    /// Joins path words into a column suffix or a `path` cell.
    pub const PATH_SEP: &str = "__";
    /// Joins the texts of different notes in a `notes` cell.
    pub const NOTES_SEP: &str = " |N| ";
}

/// Fixed vocabulary for attribute path words.
pub mod vocabulary {
    /// Words valid anywhere in an attribute path.
    pub const VALID_PATH_WORDS: &[&str] = &[
        "Affiliate Company",
        "Branch",
        "col_count",
        "context",
        "destination",
        "download_date",
        "end",
        "exclusions",
        "file_name",
        "folder_name",
        "form_type",
        "question",
        "inclusions",
        "ID",
        "note",
        "note_ID",
        "note_id",
        "NULL",
        "options",
        "reporting_period",
        "row_count",
        "routing",
        "scrape_date",
        "segment",
        "segment_type",
        "start",
        "survey_number",
        "survey_scrape_info",
        "text",
        "tracking_code",
        "type",
        "validation",
        "value",
    ];

    /// Words valid behind a `row_` or `col_` prefix on exploded matrix cells.
    pub const MATRIX_VALID_WORDS: &[&str] = &[
        "context",
        "exclusions",
        "ID",
        "index",
        "inclusions",
        "note_ID",
        "NULL",
        "text",
        "type",
        "validation",
    ];

    /// Fragment that marks a misspelled `inclusions` word.
    pub const INCLUSIONS_FRAGMENT: &str = "inclu";
    /// Fragment that marks a misspelled `exclusions` word.
    pub const EXCLUSIONS_FRAGMENT: &str = "exclu";
    /// Replacement for words containing [`INCLUSIONS_FRAGMENT`].
    pub const INCLUSIONS: &str = "inclusions";
    /// Replacement for words containing [`EXCLUSIONS_FRAGMENT`].
    pub const EXCLUSIONS: &str = "exclusions";
    /// Legacy spelling of `end` in reporting periods.
    pub const FINISH: &str = "finish";
    /// Replacement for [`FINISH`].
    pub const END: &str = "end";
}

/// Field derivation parameters.
pub mod derivation {
    /// Deepest relative segment index consulted for `type` and `first_text`.
    pub const MAX_RELATIVE_DEPTH: usize = 9;
    /// `suff_qtext` stops once its running token count exceeds this value.
    pub const SUFFICIENT_TOKENS: usize = 5;
    /// Number of nearest ancestor segment texts in `close_seg_text`.
    pub const CLOSE_SEGMENTS: usize = 3;
    /// Root-segment column suffixes holding the reporting period.
    pub const PERIOD_START_SUFFIX: &str = "reporting_period__start";
    pub const PERIOD_END_SUFFIX: &str = "reporting_period__end";
    /// Reporting period date format.
    pub const PERIOD_DATE_FORMAT: &str = "%d/%m/%Y";
}

/// Published corpus column names.
pub mod columns {
    /// Corpus primary key after deduplication.
    pub const UUID: &str = "uuid";
    /// Pre-deduplication identifier.
    pub const UID: &str = "uid";
    pub const SURVEY_ID: &str = "survey_id";
    pub const SURVEY_NAME: &str = "survey_name";
    pub const FORM_TYPE: &str = "form_type";
    pub const TR_CODE: &str = "tr_code";
    pub const TYPE: &str = "type";
    pub const PERIOD_DAYS: &str = "period_days";
    pub const PERIOD_START: &str = "period_start";
    pub const PERIOD_END: &str = "period_end";
    pub const QTEXT: &str = "qtext";
    pub const SUFF_QTEXT: &str = "suff_qtext";
    pub const FIRST_TEXT: &str = "first_text";
    pub const CLOSE_SEG_TEXT: &str = "close_seg_text";
    pub const ALL_SEG_TEXT: &str = "all_seg_text";
    pub const ALL_TEXT: &str = "all_text";
    pub const ALL_CONTEXT: &str = "all_context";
    pub const ALL_INCLUSIONS: &str = "all_inclusions";
    pub const ALL_EXCLUSIONS: &str = "all_exclusions";
    /// Texts of the notes referenced by the question or its segments.
    pub const NOTES: &str = "notes";
    /// Unit path joined with `__`.
    pub const PATH: &str = "path";

    /// Identity and derived text columns, in published order. The light table is
    /// exactly `uuid` followed by these.
    pub const FIRST_COLUMNS: [&str; 19] = [
        UID,
        SURVEY_ID,
        SURVEY_NAME,
        FORM_TYPE,
        TR_CODE,
        TYPE,
        PERIOD_DAYS,
        PERIOD_START,
        PERIOD_END,
        QTEXT,
        SUFF_QTEXT,
        FIRST_TEXT,
        CLOSE_SEG_TEXT,
        ALL_SEG_TEXT,
        ALL_TEXT,
        ALL_CONTEXT,
        ALL_INCLUSIONS,
        ALL_EXCLUSIONS,
        NOTES,
    ];
}

/// Input and output file layout.
pub mod corpus {
    /// Extension of survey documents.
    pub const JSON_EXTENSION: &str = "json";
    /// Default full-table file name.
    pub const CLEAN_FULL_FILENAME: &str = "clean-full.csv";
    /// Default light-table file name.
    pub const CLEAN_LIGHT_FILENAME: &str = "clean-light.csv";
    /// Default notes-table file name.
    pub const NOTES_FILENAME: &str = "notes.csv";
    /// Default problems report file name.
    pub const PROBLEMS_REPORT_FILENAME: &str = "problems_report.txt";
    /// Default invalid-words report file name.
    pub const INVALID_WORDS_REPORT_FILENAME: &str = "invalid_words_report.txt";
    /// Subdirectory for per-document tables.
    pub const DOCUMENTS_DIR: &str = "documents";
    /// Default output directory.
    pub const DEFAULT_OUTPUT_DIR: &str = "data";
    /// Default input directory.
    pub const DEFAULT_JSON_DIR: &str = "data/jsons";
    /// Scrape-status column naming the validated file.
    pub const STATUS_FILENAME_COLUMN: &str = "Filename (includes formtype)";
    /// Scrape-status column that is non-empty for validated files.
    pub const STATUS_VALIDATED_COLUMN: &str = "Validated?";
    /// Log message used when a document is skipped.
    pub const SKIP_DOCUMENT_MSG: &str = "skipping unreadable survey document";
}

/// Plain-text report layout.
pub mod report {
    /// Width of the dashed separator between document sections.
    pub const SEPARATOR_WIDTH: usize = 100;
    /// Marker written for documents without problems.
    pub const OK: &str = "OK";
    /// Prefix written for documents that failed outright.
    pub const ERROR_PREFIX: &str = "ERROR";
}
