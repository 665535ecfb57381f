//! Corpus assembly.
//!
//! Documents are processed independently (on the rayon pool when enabled) and
//! collected in input order. Only after every document has finished does the
//! coordinator concatenate records, assign `uuid`s, and fix the column order,
//! since deduplication depends on the order of the whole corpus.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::CorpusConfig;
use crate::constants::columns::{FIRST_COLUMNS, PATH, UUID};
use crate::constants::corpus::SKIP_DOCUMENT_MSG;
use crate::errors::CorpusError;
use crate::metrics::{CorpusSummary, summarize};
use crate::pipeline::{DocumentOutput, DocumentPipeline, NoteRow};
use crate::record::Record;
use crate::status::{SurveyNames, ValidatedFiles};
use crate::transport::fs::{JsonDirectory, document_name};
use crate::types::{ColumnName, DocumentName, Uid, Uuid};
use crate::vocabulary::Vocabulary;

/// A document that could not be processed at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentFailure {
    pub name: DocumentName,
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of processing one input path.
#[derive(Clone, Debug, PartialEq)]
pub enum DocumentResult {
    Processed(DocumentOutput),
    Failed(DocumentFailure),
}

impl DocumentResult {
    pub fn name(&self) -> &str {
        match self {
            Self::Processed(output) => &output.name,
            Self::Failed(failure) => &failure.name,
        }
    }
}

/// The assembled corpus: every document result plus the deduplicated table.
#[derive(Clone, Debug, PartialEq)]
pub struct Corpus {
    /// Per-document results in input order.
    pub documents: Vec<DocumentResult>,
    /// Corpus primary keys, one per record in [`Corpus::records`] order.
    pub uuids: Vec<Uuid>,
    /// Full-table columns after `uuid`.
    pub columns: Vec<ColumnName>,
}

impl Corpus {
    /// Concatenate processed documents and assign corpus keys.
    pub fn from_results(documents: Vec<DocumentResult>) -> Self {
        let uids: Vec<&Uid> = documents
            .iter()
            .filter_map(processed)
            .flat_map(|output| output.records.iter().map(|record| &record.uid))
            .collect();
        let uuids = assign_uuids(&uids);
        let columns = full_columns(documents.iter().filter_map(processed).flat_map(|output| &output.records));
        Self {
            documents,
            uuids,
            columns,
        }
    }

    pub fn processed(&self) -> impl Iterator<Item = &DocumentOutput> {
        self.documents.iter().filter_map(processed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &DocumentFailure> {
        self.documents.iter().filter_map(|result| match result {
            DocumentResult::Failed(failure) => Some(failure),
            DocumentResult::Processed(_) => None,
        })
    }

    /// Every record in corpus order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.processed().flat_map(|output| output.records.iter())
    }

    /// `(uuid, record)` pairs in corpus order.
    pub fn rows(&self) -> impl Iterator<Item = (&Uuid, &Record)> {
        self.uuids.iter().zip(self.records())
    }

    pub fn notes(&self) -> impl Iterator<Item = &NoteRow> {
        self.processed().flat_map(|output| output.notes.iter())
    }

    pub fn len(&self) -> usize {
        self.uuids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uuids.is_empty()
    }

    pub fn summary(&self) -> CorpusSummary {
        summarize(self)
    }
}

fn processed(result: &DocumentResult) -> Option<&DocumentOutput> {
    match result {
        DocumentResult::Processed(output) => Some(output),
        DocumentResult::Failed(_) => None,
    }
}

/// Assign corpus keys: the first occurrence of a uid keeps it, later
/// occurrences get `_(0)`, `_(1)`, ... in order. A suffix already taken by
/// another key (including a raw uid that looks suffixed) is skipped, so every
/// key is distinct.
pub fn assign_uuids<S: AsRef<str>>(uids: &[S]) -> Vec<Uuid> {
    let mut issued: HashSet<Uuid> = HashSet::with_capacity(uids.len());
    let mut next_suffix: HashMap<&str, usize> = HashMap::new();
    let mut uuids = Vec::with_capacity(uids.len());
    for uid in uids {
        let uid = uid.as_ref();
        let mut uuid = uid.to_string();
        if issued.contains(&uuid) {
            let suffix = next_suffix.entry(uid).or_insert(0);
            loop {
                uuid = format!("{uid}_({suffix})");
                *suffix += 1;
                if !issued.contains(&uuid) {
                    break;
                }
            }
        }
        issued.insert(uuid.clone());
        uuids.push(uuid);
    }
    uuids
}

/// Published columns, then `path`, then every raw column in name order.
pub fn full_columns<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<ColumnName> {
    let raw: BTreeSet<&ColumnName> = records
        .into_iter()
        .flat_map(|record| record.raw_columns())
        .collect();
    FIRST_COLUMNS
        .iter()
        .map(|column| column.to_string())
        .chain(std::iter::once(PATH.to_string()))
        .chain(raw.into_iter().cloned())
        .collect()
}

/// Identity and derived text columns.
pub fn light_columns() -> Vec<ColumnName> {
    FIRST_COLUMNS.iter().map(|column| column.to_string()).collect()
}

/// List, filter, and process every document named by `config`.
pub fn assemble(config: &CorpusConfig) -> Result<Corpus, CorpusError> {
    let paths = input_documents(config)?;
    let survey_names = match &config.survey_names {
        Some(path) => SurveyNames::from_path(path)?,
        None => SurveyNames::default(),
    };
    let pipeline = DocumentPipeline::new(Vocabulary::standard(), survey_names);
    info!(
        documents = paths.len(),
        parallel = config.parallel,
        "assembling corpus"
    );
    let corpus = Corpus::from_results(process_documents(&pipeline, &paths, config.parallel));
    let summary = corpus.summary();
    info!(
        processed = summary.processed,
        failed = summary.failed,
        rows = summary.rows,
        with_problems = summary.documents_with_problems,
        "corpus assembled"
    );
    Ok(corpus)
}

/// Sorted document paths, restricted to validated documents when requested.
pub fn input_documents(config: &CorpusConfig) -> Result<Vec<PathBuf>, CorpusError> {
    let paths = JsonDirectory::new(&config.json_dir)
        .with_follow_symlinks(config.follow_links)
        .with_recursive(config.recursive)
        .list_documents()?;
    if !config.only_validated {
        return Ok(paths);
    }
    let status = config.scrape_status.as_ref().ok_or_else(|| {
        CorpusError::Configuration("only_validated requires a scrape-status table".to_string())
    })?;
    Ok(ValidatedFiles::from_path(status)?.filter(paths))
}

/// Run the pipeline over every path; results keep input order.
pub fn process_documents(
    pipeline: &DocumentPipeline,
    paths: &[PathBuf],
    parallel: bool,
) -> Vec<DocumentResult> {
    let run = |path: &PathBuf| process_one(pipeline, path);
    if parallel {
        paths.par_iter().map(run).collect()
    } else {
        paths.iter().map(run).collect()
    }
}

fn process_one(pipeline: &DocumentPipeline, path: &Path) -> DocumentResult {
    match pipeline.process_path(path) {
        Ok(output) => DocumentResult::Processed(output),
        Err(err) => {
            let name = document_name(path);
            warn!(document = %name, error = %err, "{}", SKIP_DOCUMENT_MSG);
            DocumentResult::Failed(DocumentFailure {
                name,
                path: path.to_path_buf(),
                message: err.to_string(),
            })
        }
    }
}

/// Write `uuid` followed by `columns` for every row.
pub fn write_table<'a, W, I>(writer: W, columns: &[ColumnName], rows: I) -> Result<usize, CorpusError>
where
    W: io::Write,
    I: IntoIterator<Item = (&'a str, &'a Record)>,
{
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(std::iter::once(UUID).chain(columns.iter().map(String::as_str)))?;
    let mut written = 0;
    for (key, record) in rows {
        let mut row = Vec::with_capacity(columns.len() + 1);
        row.push(key.to_string());
        row.extend(
            columns
                .iter()
                .map(|column| record.cell(column).unwrap_or_default()),
        );
        csv.write_record(&row)?;
        written += 1;
    }
    csv.flush()?;
    Ok(written)
}

/// Write the long-format notes table.
pub fn write_notes<'a, W, I>(writer: W, notes: I) -> Result<usize, CorpusError>
where
    W: io::Write,
    I: IntoIterator<Item = &'a NoteRow>,
{
    let mut csv = csv::Writer::from_writer(writer);
    let mut written = 0;
    for note in notes {
        csv.serialize(note)?;
        written += 1;
    }
    if written == 0 {
        csv.write_record(["survey_id", "form_type", "note_id", "attr_path", "value"])?;
    }
    csv.flush()?;
    Ok(written)
}

fn create_file(path: &Path) -> Result<fs::File, CorpusError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::File::create(path)?)
}

/// Write the full table, the light table, and (when enabled) the notes and
/// per-document tables under the configured output directory.
pub fn write_corpus(corpus: &Corpus, config: &CorpusConfig) -> Result<(), CorpusError> {
    let rows = || corpus.rows().map(|(uuid, record)| (uuid.as_str(), record));

    let full_path = config.output_path(&config.files.full);
    let written = write_table(create_file(&full_path)?, &corpus.columns, rows())?;
    info!(path = %full_path.display(), rows = written, columns = corpus.columns.len() + 1, "wrote full table");

    let light_path = config.output_path(&config.files.light);
    write_table(create_file(&light_path)?, &light_columns(), rows())?;
    info!(path = %light_path.display(), rows = written, "wrote light table");

    if config.write_notes {
        let notes_path = config.output_path(&config.files.notes);
        let notes = write_notes(create_file(&notes_path)?, corpus.notes())?;
        info!(path = %notes_path.display(), notes, "wrote notes table");
    }

    if config.per_document_csv {
        for output in corpus.processed() {
            let path = config.document_table_path(&output.path);
            let columns = full_columns(&output.records);
            // Per-document tables are keyed by the undeduplicated uid.
            let rows = output
                .records
                .iter()
                .map(|record| (record.uid.as_str(), record));
            write_table(create_file(&path)?, &columns, rows)?;
        }
        info!(dir = %config.documents_dir().display(), "wrote per-document tables");
    }
    Ok(())
}
