//! Root structure correction.
//!
//! Some scraped documents carry the root `segment` as a list whose elements are
//! the survey segment plus its would-be children. The correction nests the list
//! back under the survey segment.

use serde_json::Value;
use tracing::debug;

use crate::constants::json_keys::{SEGMENT, SEGMENT_TYPE, SURVEY_SEGMENT_TYPE};
use crate::errors::CorpusError;
use crate::problems::{Problem, ProblemKind, Staged};

/// True when the root `segment` is a list of more than one element.
pub fn is_top_level_segment_incorrect(root: &Value) -> bool {
    matches!(root.get(SEGMENT), Some(Value::Array(items)) if items.len() > 1)
}

fn is_survey_segment(node: &Value) -> bool {
    node.get(SEGMENT_TYPE).and_then(Value::as_str) == Some(SURVEY_SEGMENT_TYPE)
}

/// Return a corrected copy of `root`; the input is never mutated.
///
/// Fails when the malformed list contains no survey segment, since there is no
/// element that could safely become the root.
pub fn correct_top_level_segment(
    document: &str,
    root: &Value,
) -> Result<Staged<Value>, CorpusError> {
    if !root.is_object() {
        return Err(CorpusError::structure(document, "root node is not an object"));
    }
    if !is_top_level_segment_incorrect(root) {
        return Ok(Staged::clean(root.clone()));
    }

    let mut corrected = root.clone();
    let Some(slot) = corrected.get_mut(SEGMENT) else {
        return Err(CorpusError::structure(document, "top-level segment vanished"));
    };
    let Value::Array(mut segments) = slot.take() else {
        return Err(CorpusError::structure(document, "top-level segment is not a list"));
    };

    let survey_idx = segments.iter().position(is_survey_segment).ok_or_else(|| {
        CorpusError::structure(
            document,
            format!(
                "top-level segment list has {} elements but none with {SEGMENT_TYPE} == \"{SURVEY_SEGMENT_TYPE}\"",
                segments.len()
            ),
        )
    })?;
    let mut survey = segments.remove(survey_idx);
    debug!(
        document,
        survey_idx,
        nested = segments.len(),
        "nesting top-level segments under survey segment"
    );

    if let Some(survey_map) = survey.as_object_mut() {
        survey_map.insert(SEGMENT.to_string(), Value::Array(segments));
    }
    *slot = survey;

    Ok(Staged::with_problems(
        corrected,
        vec![Problem::flag(ProblemKind::IncorrectTopLevelSegment)],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn well_formed_root_is_returned_unchanged() {
        let root = json!({"segment": {"segment_type": "survey", "text": "S"}});
        let staged = correct_top_level_segment("doc.json", &root).unwrap();
        assert_eq!(staged.value, root);
        assert!(staged.problems.is_empty());

        let single = json!({"segment": [{"segment_type": "survey"}]});
        assert!(!is_top_level_segment_incorrect(&single));
    }

    #[test]
    fn list_segment_is_nested_under_survey_segment() {
        let root = json!({
            "survey_scrape_info": {"file_name": "a.pdf"},
            "segment": [
                {"text": "Section A", "question": {"tracking_code": "1"}},
                {"segment_type": "survey", "survey_number": "002"},
                {"text": "Section B"}
            ]
        });
        let staged = correct_top_level_segment("doc.json", &root).unwrap();
        assert_eq!(
            staged.problems,
            vec![Problem::flag(ProblemKind::IncorrectTopLevelSegment)]
        );
        let expected = json!({
            "survey_scrape_info": {"file_name": "a.pdf"},
            "segment": {
                "segment_type": "survey",
                "survey_number": "002",
                "segment": [
                    {"text": "Section A", "question": {"tracking_code": "1"}},
                    {"text": "Section B"}
                ]
            }
        });
        assert_eq!(staged.value, expected);
        // input untouched
        assert!(root["segment"].is_array());
        assert_eq!(root["segment"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn missing_survey_segment_is_a_hard_error() {
        let root = json!({"segment": [{"text": "A"}, {"text": "B"}]});
        let err = correct_top_level_segment("broken.json", &root).unwrap_err();
        match err {
            CorpusError::Structure { document, details } => {
                assert_eq!(document, "broken.json");
                assert!(details.contains("survey"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(correct_top_level_segment("x.json", &json!([1, 2])).is_err());
    }
}
