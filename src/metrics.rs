use indexmap::IndexMap;
use serde::Serialize;

use crate::corpus::Corpus;
use crate::types::SurveyId;

/// Rows contributed by one survey.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SurveyRows {
    /// Empty for rows without a survey number.
    pub survey: SurveyId,
    pub rows: usize,
    /// Fraction of all corpus rows.
    pub share: f64,
}

/// Corpus-level counts logged after assembly.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorpusSummary {
    /// Documents that produced a table (possibly empty).
    pub processed: usize,
    /// Documents skipped because they could not be decoded or corrected.
    pub failed: usize,
    pub rows: usize,
    /// Rows whose `uuid` differs from their `uid`.
    pub duplicate_rows: usize,
    pub documents_with_problems: usize,
    pub notes: usize,
    /// Surveys in first-seen corpus order.
    pub surveys: Vec<SurveyRows>,
}

impl CorpusSummary {
    /// Survey with the most rows; the earliest one on ties.
    pub fn largest_survey(&self) -> Option<&SurveyRows> {
        self.surveys
            .iter()
            .rev()
            .max_by_key(|survey| survey.rows)
    }
}

/// Row counts per survey, keeping the order surveys first appear in.
pub fn rows_by_survey(counts: &IndexMap<SurveyId, usize>) -> Vec<SurveyRows> {
    let total: usize = counts.values().sum();
    counts
        .iter()
        .map(|(survey, rows)| SurveyRows {
            survey: survey.clone(),
            rows: *rows,
            share: if total == 0 {
                0.0
            } else {
                *rows as f64 / total as f64
            },
        })
        .collect()
}

/// Summarize an assembled corpus.
pub fn summarize(corpus: &Corpus) -> CorpusSummary {
    let mut counts: IndexMap<SurveyId, usize> = IndexMap::new();
    for record in corpus.records() {
        *counts
            .entry(record.survey_id.clone().unwrap_or_default())
            .or_insert(0) += 1;
    }
    CorpusSummary {
        processed: corpus.processed().count(),
        failed: corpus.failures().count(),
        rows: corpus.len(),
        duplicate_rows: corpus
            .rows()
            .filter(|(uuid, record)| **uuid != record.uid)
            .count(),
        documents_with_problems: corpus
            .processed()
            .filter(|output| !output.problems.is_empty())
            .count(),
        notes: corpus.notes().count(),
        surveys: rows_by_survey(&counts),
    }
}
