use std::collections::HashSet;

use proptest::prelude::*;
use proptest::test_runner::Config;
use serde_json::{Value, json};

use qbank::corpus::assign_uuids;
use qbank::node::path_to_string;
use qbank::traverse::traverse;
use qbank::utils::word_count;
use qbank::{DocumentPipeline, Staged};

/// Segment tree of the given fan-out per level, one question per leaf segment.
fn nested_document(fanouts: &[usize]) -> Value {
    fn level(fanouts: &[usize], label: &str) -> Value {
        match fanouts.split_first() {
            None => json!({"text": format!("Segment {label}"), "question": {"tracking_code": label, "text": "Q"}}),
            Some((width, rest)) => {
                let children: Vec<Value> = (0..*width)
                    .map(|idx| level(rest, &format!("{label}_{idx}")))
                    .collect();
                json!({"text": format!("Segment {label}"), "segment": children})
            }
        }
    }
    let mut root = level(fanouts, "r");
    if let Some(map) = root.as_object_mut() {
        map.insert("survey_number".into(), json!("002"));
        map.insert("form_type".into(), json!("0001"));
    }
    json!({"segment": root})
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn uuids_are_unique_and_keep_first_occurrence(
        uids in proptest::collection::vec(r"[a-c]{1,2}(_\([0-2]\))?", 0..40)
    ) {
        let uuids = assign_uuids(uids.as_slice());
        prop_assert_eq!(uuids.len(), uids.len());
        let distinct: HashSet<&String> = uuids.iter().collect();
        prop_assert_eq!(distinct.len(), uuids.len());

        let mut issued: HashSet<&str> = HashSet::new();
        for (uid, uuid) in uids.iter().zip(&uuids) {
            if !issued.contains(uid.as_str()) {
                prop_assert_eq!(uuid, uid);
            } else {
                prop_assert!(uuid.starts_with(&format!("{uid}_(")), "{} from {}", uuid, uid);
            }
            issued.insert(uuid.as_str());
        }
    }

    #[test]
    fn units_only_carry_attributes_of_their_ancestors(
        fanouts in proptest::collection::vec(1usize..4, 1..4)
    ) {
        let doc = nested_document(&fanouts);
        let units = traverse(&doc);
        prop_assert_eq!(units.len(), fanouts.iter().product::<usize>());
        for unit in &units {
            // Path of the question node holding the tracking code.
            let owner = path_to_string(&unit.path[..unit.path.len() - 1]);
            for attr in &unit.attrs {
                let attr_owner = path_to_string(&attr.path[..attr.path.len() - 1]);
                prop_assert!(
                    owner.starts_with(&attr_owner),
                    "{} is not an ancestor of {}",
                    attr_owner,
                    owner
                );
            }
        }
    }

    #[test]
    fn suff_qtext_stops_once_enough_words(
        fanouts in proptest::collection::vec(1usize..3, 1..5)
    ) {
        let output = DocumentPipeline::default()
            .process_document("prop.json", Staged::clean(nested_document(&fanouts)))
            .unwrap();
        for record in &output.records {
            let pieces: Vec<&str> = record.suff_qtext.split(" ||| ").collect();
            prop_assert_eq!(*pieces.last().unwrap(), record.qtext.as_str());
            // Every prefix without the most distant piece is still short.
            let without_first: usize = pieces[1..].iter().map(|p| word_count(p)).sum();
            prop_assert!(without_first <= 5);
        }
    }
}
