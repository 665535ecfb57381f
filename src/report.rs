//! Plain-text audit reports.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::constants::report::{ERROR_PREFIX, OK, SEPARATOR_WIDTH};
use crate::corpus::DocumentResult;
use crate::errors::CorpusError;

/// One section per document: separator, file name, then each problem as
/// `KIND: detail`, `OK` when there are none, or `ERROR: message` when the
/// document failed.
pub fn problems_report(documents: &[DocumentResult]) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut report = String::new();
    for document in documents {
        report.push('\n');
        report.push_str(&separator);
        report.push('\n');
        report.push_str(document.name());
        report.push('\n');
        match document {
            DocumentResult::Failed(failure) => {
                let _ = writeln!(report, "{ERROR_PREFIX}: {}", failure.message);
            }
            DocumentResult::Processed(output) if output.problems.is_empty() => {
                report.push_str(OK);
                report.push('\n');
            }
            DocumentResult::Processed(output) => {
                for problem in &output.problems {
                    let _ = writeln!(report, "{problem}");
                }
            }
        }
    }
    report
}

/// Documents with unknown vocabulary words, one tab-indented word per line.
pub fn invalid_words_report(documents: &[DocumentResult]) -> String {
    let mut report = String::new();
    for document in documents {
        let DocumentResult::Processed(output) = document else {
            continue;
        };
        let words = output.invalid_words();
        if words.is_empty() {
            continue;
        }
        report.push_str(&output.name);
        report.push('\n');
        for word in words {
            let _ = writeln!(report, "\t{word}");
        }
        report.push('\n');
    }
    report
}

/// Write a report, creating parent directories as needed.
pub fn write_report(path: &Path, report: &str) -> Result<(), CorpusError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::DocumentFailure;
    use crate::pipeline::DocumentOutput;
    use crate::problems::{Problem, ProblemKind};
    use std::path::PathBuf;

    fn processed(name: &str, problems: Vec<Problem>) -> DocumentResult {
        DocumentResult::Processed(DocumentOutput {
            name: name.to_string(),
            path: PathBuf::from(name),
            records: Vec::new(),
            notes: Vec::new(),
            problems,
        })
    }

    fn documents() -> Vec<DocumentResult> {
        vec![
            processed("clean.json", Vec::new()),
            processed(
                "messy.json",
                vec![
                    Problem::flag(ProblemKind::IncorrectTopLevelSegment),
                    Problem::new(ProblemKind::InvalidWords, "banana, finish"),
                ],
            ),
            DocumentResult::Failed(DocumentFailure {
                name: "broken.json".into(),
                path: PathBuf::from("broken.json"),
                message: "document 'broken.json' is not valid JSON".into(),
            }),
        ]
    }

    #[test]
    fn problems_report_has_one_section_per_document() {
        let dashes = "-".repeat(100);
        let expected = format!(
            "\n{dashes}\nclean.json\nOK\n\
             \n{dashes}\nmessy.json\nINCORRECT_TOP_LEVEL_SEGMENT: True\nINVALID_KEYWORDS: banana, finish\n\
             \n{dashes}\nbroken.json\nERROR: document 'broken.json' is not valid JSON\n"
        );
        assert_eq!(problems_report(&documents()), expected);
    }

    #[test]
    fn invalid_words_report_lists_only_affected_documents() {
        assert_eq!(
            invalid_words_report(&documents()),
            "messy.json\n\tbanana\n\tfinish\n\n"
        );
    }
}
