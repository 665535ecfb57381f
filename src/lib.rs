#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// clap runner behind the `json2corpus` binary.
pub mod apps;
/// Scoped column keys derived from attribute paths.
pub mod columns;
/// Corpus build configuration.
pub mod config;
/// Centralized constants: document keys, separators, vocabulary, published columns.
pub mod constants;
/// Corpus assembly, deduplication, and table output.
pub mod corpus;
/// Reporting-period dates.
pub mod dates;
/// Matrix node explosion.
pub mod matrix;
/// Corpus summary metrics.
pub mod metrics;
/// Document node model.
pub mod node;
/// Root segment correction.
pub mod normalize;
/// Per-document pipeline.
pub mod pipeline;
/// Recoverable per-document problems.
pub mod problems;
/// Record building and field derivation.
pub mod record;
/// Plain-text audit reports.
pub mod report;
/// Scrape-status and survey-name tables.
pub mod status;
/// Input transports (filesystem today).
pub mod transport;
/// Tree traversal.
pub mod traverse;
/// Shared type aliases.
pub mod types;
/// Tokenizing and joining helpers.
pub mod utils;
/// Path-word vocabulary validation.
pub mod vocabulary;

mod errors;

pub use config::{CorpusConfig, OutputFiles};
pub use corpus::{Corpus, DocumentFailure, DocumentResult, assemble, write_corpus};
pub use errors::CorpusError;
pub use metrics::{CorpusSummary, SurveyRows};
pub use node::{Attr, NodeKind, NodePath, NoteUnit, PathWord, TraversalUnit};
pub use pipeline::{DocumentOutput, DocumentPipeline, NoteRow};
pub use problems::{Problem, ProblemKind, Staged};
pub use record::{NoteTexts, Record};
pub use status::{SurveyNames, ValidatedFiles};
pub use types::{
    CellValue, ColumnName, DocumentName, FormType, NoteId, SurveyId, TrackingCode, Uid, Uuid,
    VocabularyWord,
};
pub use vocabulary::Vocabulary;
