use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::constants::corpus::JSON_EXTENSION;
use crate::errors::CorpusError;
use crate::problems::{Problem, ProblemKind, Staged};
use crate::types::DocumentName;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
/// Problem detail recorded for a document decoded past a byte order mark.
const BOM_ENCODING_DETAIL: &str = "encoding is UTF-8-sig";

/// Filesystem listing of survey documents under a root directory.
pub struct JsonDirectory {
    root: PathBuf,
    follow_links: bool,
    recursive: bool,
}

impl JsonDirectory {
    /// Create a listing rooted at `root` (top level only).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_links: false,
            recursive: false,
        }
    }

    /// Configure symlink traversal.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Descend into subdirectories.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every `*.json` file, sorted by path.
    pub fn list_documents(&self) -> Result<Vec<PathBuf>, CorpusError> {
        if !self.root.is_dir() {
            return Err(CorpusError::Configuration(format!(
                "json directory '{}' does not exist",
                self.root.display()
            )));
        }
        let mut walker = WalkDir::new(&self.root).min_depth(1);
        if !self.recursive {
            walker = walker.max_depth(1);
        }
        if self.follow_links {
            walker = walker.follow_links(true);
        }
        let mut documents: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_json_file(path))
            .collect();
        documents.sort();
        debug!(
            root = %self.root.display(),
            documents = documents.len(),
            "listed survey documents"
        );
        Ok(documents)
    }
}

/// True if the path has a `.json` extension (case-insensitive).
pub fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(JSON_EXTENSION))
        .unwrap_or(false)
}

/// File name used to label a document in logs and reports.
pub fn document_name(path: &Path) -> DocumentName {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Decode a document from raw bytes.
///
/// UTF-8 with a byte order mark is accepted but flagged with an `Encoding`
/// problem; any other non-UTF-8 input is an error.
pub fn decode_document(document: &str, bytes: &[u8]) -> Result<Staged<Value>, CorpusError> {
    let (body, problems) = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => (
            rest,
            vec![Problem::new(ProblemKind::Encoding, BOM_ENCODING_DETAIL)],
        ),
        None => (bytes, Vec::new()),
    };
    let text = std::str::from_utf8(body).map_err(|_| CorpusError::Encoding {
        document: document.to_string(),
    })?;
    let root = serde_json::from_str(text).map_err(|source| CorpusError::Json {
        document: document.to_string(),
        source,
    })?;
    Ok(Staged::with_problems(root, problems))
}

/// Read and decode one document from disk.
pub fn read_document(path: &Path) -> Result<Staged<Value>, CorpusError> {
    let bytes = fs::read(path)?;
    decode_document(&document_name(path), &bytes)
}
