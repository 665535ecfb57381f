//! Recoverable per-document anomalies and the staged values that carry them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of recoverable anomaly found while processing one document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProblemKind {
    /// The root `segment` was a list instead of a single survey object.
    IncorrectTopLevelSegment,
    /// Attribute path words outside the vocabulary.
    InvalidWords,
    /// No record has a usable reporting period.
    ReportingPeriod,
    /// A matrix node was malformed or could not be exploded.
    MatrixParsing,
    /// The document produced no records.
    NoData,
    /// The document was UTF-8 with a byte order mark.
    Encoding,
    /// No record has a form type.
    FormType,
}

impl ProblemKind {
    /// Published report tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IncorrectTopLevelSegment => "INCORRECT_TOP_LEVEL_SEGMENT",
            Self::InvalidWords => "INVALID_KEYWORDS",
            Self::ReportingPeriod => "PROBLEM_WITH_REPORTING_PERIOD",
            Self::MatrixParsing => "MATRIX_PARSING_PROBLEM",
            Self::NoData => "NO_DATA",
            Self::Encoding => "ENCODING_NOT_UTF8",
            Self::FormType => "MISSING_FORM_TYPE",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(kind, detail)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub kind: ProblemKind,
    pub detail: String,
}

impl Problem {
    pub fn new(kind: ProblemKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// A problem whose presence is the whole message (rendered as `True`).
    pub fn flag(kind: ProblemKind) -> Self {
        Self::new(kind, "True")
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

/// A stage result paired with the problems found while producing it.
///
/// Stages never share a problems list; callers fold each stage's problems into
/// their own with [`Staged::merge_into`].
#[derive(Clone, Debug, PartialEq)]
pub struct Staged<T> {
    pub value: T,
    pub problems: Vec<Problem>,
}

impl<T> Staged<T> {
    /// A value without problems.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            problems: Vec::new(),
        }
    }

    pub fn with_problems(value: T, problems: Vec<Problem>) -> Self {
        Self { value, problems }
    }

    /// Append this stage's problems to `problems` and return the value.
    pub fn merge_into(self, problems: &mut Vec<Problem>) -> T {
        problems.extend(self.problems);
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Staged<U> {
        Staged {
            value: f(self.value),
            problems: self.problems,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_renders_report_line() {
        let problem = Problem::flag(ProblemKind::NoData);
        assert_eq!(problem.to_string(), "NO_DATA: True");
        let words = Problem::new(ProblemKind::InvalidWords, "finish, inclusion");
        assert_eq!(words.to_string(), "INVALID_KEYWORDS: finish, inclusion");
    }

    #[test]
    fn merge_into_appends_in_order() {
        let mut problems = vec![Problem::flag(ProblemKind::Encoding)];
        let staged = Staged::with_problems(7, vec![Problem::flag(ProblemKind::MatrixParsing)]);
        let value = staged.merge_into(&mut problems);
        assert_eq!(value, 7);
        assert_eq!(
            problems.iter().map(|p| p.kind).collect::<Vec<_>>(),
            vec![ProblemKind::Encoding, ProblemKind::MatrixParsing]
        );
    }

    #[test]
    fn map_keeps_problems() {
        let staged =
            Staged::with_problems("a", vec![Problem::flag(ProblemKind::NoData)]).map(str::len);
        assert_eq!(staged.value, 1);
        assert_eq!(staged.problems.len(), 1);
    }
}
