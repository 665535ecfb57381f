use std::io;

use thiserror::Error;

use crate::types::DocumentName;

/// Error type for document decoding, structural failures, and corpus IO.
///
/// Recoverable anomalies are never reported through this type; they travel as
/// [`Problem`](crate::problems::Problem)s next to the value they describe.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("document '{document}' is not valid JSON: {source}")]
    Json {
        document: DocumentName,
        #[source]
        source: serde_json::Error,
    },
    #[error("document '{document}' is neither UTF-8 nor UTF-8 with BOM")]
    Encoding { document: DocumentName },
    #[error("document '{document}' has an unusable structure: {details}")]
    Structure {
        document: DocumentName,
        details: String,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CorpusError {
    /// Attach a document name to a structural failure.
    pub fn structure(document: impl Into<DocumentName>, details: impl Into<String>) -> Self {
        Self::Structure {
            document: document.into(),
            details: details.into(),
        }
    }
}
