//! Side tables: the scrape-status sheet and the survey-name lookup.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::constants::corpus::{STATUS_FILENAME_COLUMN, STATUS_VALIDATED_COLUMN};
use crate::errors::CorpusError;

/// Integer survey number -> human-readable survey name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurveyNames {
    names: HashMap<u32, String>,
}

impl SurveyNames {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(number, name)| (number, name.into()))
                .collect(),
        }
    }

    /// Read a two-column `survey_number,survey_name` table with a header row.
    /// Rows whose number does not parse are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CorpusError> {
        let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let mut names = HashMap::new();
        for row in csv.records() {
            let row = row?;
            let (Some(number), Some(name)) = (row.get(0), row.get(1)) else {
                continue;
            };
            match number.trim().parse::<u32>() {
                Ok(number) => {
                    names.insert(number, name.trim().to_string());
                }
                Err(_) => debug!(number, "ignoring survey-name row with a non-numeric survey number"),
            }
        }
        Ok(Self { names })
    }

    pub fn from_path(path: &Path) -> Result<Self, CorpusError> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    /// Name for a textual survey id such as `002`.
    pub fn lookup(&self, survey_id: &str) -> Option<String> {
        let number = survey_id.trim().parse::<u32>().ok()?;
        self.names.get(&number).cloned()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// File-name fragments of documents marked as validated in the scrape-status sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatedFiles {
    fragments: Vec<String>,
}

impl ValidatedFiles {
    /// Keep rows whose `Validated?` cell is non-empty.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CorpusError> {
        let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or_else(|| {
                    CorpusError::Configuration(format!(
                        "scrape-status table has no '{name}' column"
                    ))
                })
        };
        let filename_idx = column(STATUS_FILENAME_COLUMN)?;
        let validated_idx = column(STATUS_VALIDATED_COLUMN)?;

        let mut fragments = Vec::new();
        for row in csv.records() {
            let row = row?;
            let validated = row
                .get(validated_idx)
                .is_some_and(|cell| !cell.trim().is_empty());
            let filename = row.get(filename_idx).map(str::trim).unwrap_or_default();
            if validated && !filename.is_empty() {
                fragments.push(filename.to_string());
            }
        }
        Ok(Self { fragments })
    }

    pub fn from_path(path: &Path) -> Result<Self, CorpusError> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    /// True when the file name contains any validated fragment.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        self.fragments.iter().any(|fragment| name.contains(fragment.as_str()))
    }

    /// Keep only accepted paths, preserving order.
    pub fn filter(&self, paths: Vec<PathBuf>) -> Vec<PathBuf> {
        let before = paths.len();
        let kept: Vec<PathBuf> = paths.into_iter().filter(|path| self.accepts(path)).collect();
        if kept.is_empty() && before > 0 {
            warn!(candidates = before, "no document matched the validated file list");
        }
        kept
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survey_names_parse_numbers_and_skip_bad_rows() {
        let table = "survey_number,survey_name\n2,Monthly Business Survey\nabc,Broken\n 108 , Annual Survey \n";
        let names = SurveyNames::from_reader(table.as_bytes()).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names.lookup("002").as_deref(), Some("Monthly Business Survey"));
        assert_eq!(names.lookup("108").as_deref(), Some("Annual Survey"));
        assert_eq!(names.lookup("999"), None);
        assert_eq!(names.lookup("x"), None);
    }

    #[test]
    fn validated_files_keep_rows_with_a_mark() {
        let table = "Survey,Filename (includes formtype),Validated?\n\
                     002,ex_sel002-ft0001,Y\n\
                     108,ex_sel108-ft0002,\n\
                     134,ex_sel134-ft0005,yes\n";
        let validated = ValidatedFiles::from_reader(table.as_bytes()).unwrap();
        assert_eq!(validated.len(), 2);
        let kept = validated.filter(vec![
            PathBuf::from("jsons/ex_sel002-ft0001.json"),
            PathBuf::from("jsons/ex_sel108-ft0002.json"),
            PathBuf::from("jsons/ex_sel134-ft0005_v2.json"),
        ]);
        assert_eq!(
            kept,
            vec![
                PathBuf::from("jsons/ex_sel002-ft0001.json"),
                PathBuf::from("jsons/ex_sel134-ft0005_v2.json"),
            ]
        );
    }

    #[test]
    fn missing_status_column_is_a_configuration_error() {
        let err = ValidatedFiles::from_reader("Survey,Validated?\n1,Y\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CorpusError::Configuration(_)));
    }
}
