use std::path::{Path, PathBuf};

use crate::constants::corpus::{
    CLEAN_FULL_FILENAME, CLEAN_LIGHT_FILENAME, DEFAULT_JSON_DIR, DEFAULT_OUTPUT_DIR,
    DOCUMENTS_DIR, INVALID_WORDS_REPORT_FILENAME, NOTES_FILENAME, PROBLEMS_REPORT_FILENAME,
};

/// Output file names, relative to the output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFiles {
    /// All derived and raw columns.
    pub full: String,
    /// Identity and derived text columns only.
    pub light: String,
    /// Long-format notes table.
    pub notes: String,
    /// Per-document problems report.
    pub problems_report: String,
    /// Per-document invalid vocabulary words.
    pub invalid_words_report: String,
    /// Subdirectory for per-document tables.
    pub documents_dir: String,
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            full: CLEAN_FULL_FILENAME.to_string(),
            light: CLEAN_LIGHT_FILENAME.to_string(),
            notes: NOTES_FILENAME.to_string(),
            problems_report: PROBLEMS_REPORT_FILENAME.to_string(),
            invalid_words_report: INVALID_WORDS_REPORT_FILENAME.to_string(),
            documents_dir: DOCUMENTS_DIR.to_string(),
        }
    }
}

/// Corpus build configuration.
#[derive(Clone, Debug)]
pub struct CorpusConfig {
    /// Directory holding the survey documents.
    pub json_dir: PathBuf,
    /// Directory receiving tables and reports.
    pub output_dir: PathBuf,
    /// Scrape-status sheet used by the validated filter.
    pub scrape_status: Option<PathBuf>,
    /// Restrict input to documents marked validated in `scrape_status`.
    pub only_validated: bool,
    /// Two-column `survey_number,survey_name` table.
    pub survey_names: Option<PathBuf>,
    /// Output file names.
    pub files: OutputFiles,
    /// Write `<output>/documents/<stem>.csv` per document.
    pub per_document_csv: bool,
    /// Write the notes table.
    pub write_notes: bool,
    /// Process documents on the rayon pool.
    pub parallel: bool,
    /// Follow symlinks while listing documents.
    pub follow_links: bool,
    /// Descend into subdirectories of `json_dir`.
    pub recursive: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            json_dir: PathBuf::from(DEFAULT_JSON_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            scrape_status: None,
            only_validated: false,
            survey_names: None,
            files: OutputFiles::default(),
            per_document_csv: false,
            write_notes: true,
            parallel: true,
            follow_links: false,
            recursive: false,
        }
    }
}

impl CorpusConfig {
    /// Config reading documents from `json_dir` with every other default.
    pub fn new(json_dir: impl Into<PathBuf>) -> Self {
        Self {
            json_dir: json_dir.into(),
            ..Self::default()
        }
    }

    /// Override the output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Set the scrape-status sheet and whether to filter on it.
    pub fn with_scrape_status(mut self, path: impl Into<PathBuf>, only_validated: bool) -> Self {
        self.scrape_status = Some(path.into());
        self.only_validated = only_validated;
        self
    }

    /// Set the survey-name table.
    pub fn with_survey_names(mut self, path: impl Into<PathBuf>) -> Self {
        self.survey_names = Some(path.into());
        self
    }

    /// Override output file names.
    pub fn with_files(mut self, files: OutputFiles) -> Self {
        self.files = files;
        self
    }

    /// Enable or disable per-document tables.
    pub fn with_per_document_csv(mut self, enabled: bool) -> Self {
        self.per_document_csv = enabled;
        self
    }

    /// Enable or disable the notes table.
    pub fn with_notes(mut self, enabled: bool) -> Self {
        self.write_notes = enabled;
        self
    }

    /// Enable or disable parallel document processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Override whether symlinks are followed during listing.
    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Override whether subdirectories are listed.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Path of an output file name under the output directory.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Directory receiving per-document tables.
    pub fn documents_dir(&self) -> PathBuf {
        self.output_dir.join(&self.files.documents_dir)
    }

    /// Per-document table path for a document file.
    pub fn document_table_path(&self, document: &Path) -> PathBuf {
        let stem = document
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.documents_dir().join(format!("{stem}.csv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_published_layout() {
        let config = CorpusConfig::default();
        assert_eq!(config.json_dir, PathBuf::from("data/jsons"));
        assert_eq!(config.output_path(&config.files.full), PathBuf::from("data/clean-full.csv"));
        assert!(config.parallel);
        assert!(!config.only_validated);
    }

    #[test]
    fn builders_override_fields() {
        let config = CorpusConfig::new("in")
            .with_output_dir("out")
            .with_scrape_status("status.csv", true)
            .with_per_document_csv(true)
            .with_parallel(false);
        assert_eq!(config.scrape_status, Some(PathBuf::from("status.csv")));
        assert!(config.only_validated);
        assert!(!config.parallel);
        assert_eq!(
            config.document_table_path(Path::new("in/ex_sel002-ft0001.json")),
            PathBuf::from("out/documents/ex_sel002-ft0001.csv")
        );
    }
}
