use std::collections::HashMap;

use serde::Serialize;

use crate::curriculum::all_topics;
use crate::model::{Subject, TopicProgress, TopicStatus};

/// Default status per topic for topics never explicitly edited: the baseline
/// `statusHint` if present, else NOT_STARTED.
pub fn fallback_statuses(subjects: &[Subject]) -> HashMap<String, TopicStatus> {
    let mut map = HashMap::new();
    for subject in subjects {
        for topic in all_topics(subject) {
            map.insert(
                topic.id.clone(),
                topic.status_hint.unwrap_or(TopicStatus::NotStarted),
            );
        }
    }
    map
}

/// The one resolution rule every consumer shares:
/// explicit progress entry > fallback hint > NOT_STARTED.
/// Coverage, badges and submission snapshots must all go through here or
/// their numbers will disagree.
pub fn resolved_status(
    topic_id: &str,
    progress: &HashMap<String, TopicProgress>,
    fallback: &HashMap<String, TopicStatus>,
) -> TopicStatus {
    if let Some(p) = progress.get(topic_id) {
        return p.status;
    }
    fallback
        .get(topic_id)
        .copied()
        .unwrap_or(TopicStatus::NotStarted)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub percent: i64,
    pub completed: i64,
    pub total: i64,
}

/// Round-half-up integer percent. `completed/total` must be in [0, 1].
fn percent_of(completed: i64, total: i64) -> i64 {
    ((100.0 * completed as f64 / total as f64) + 0.5).floor() as i64
}

/// Pure; safe to call repeatedly for display. The result is also the value
/// frozen into a submission at submit time.
pub fn compute_coverage(
    subject: &Subject,
    progress: &HashMap<String, TopicProgress>,
    fallback: &HashMap<String, TopicStatus>,
) -> Coverage {
    let topics = all_topics(subject);
    let total = topics.len() as i64;
    if total == 0 {
        return Coverage {
            percent: 0,
            completed: 0,
            total: 0,
        };
    }

    let completed = topics
        .iter()
        .filter(|t| resolved_status(&t.id, progress, fallback) == TopicStatus::Completed)
        .count() as i64;

    Coverage {
        percent: percent_of(completed, total),
        completed,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Topic, Unit};

    fn topic(id: &str, hint: Option<TopicStatus>) -> Topic {
        Topic {
            id: id.to_string(),
            title: id.to_string(),
            teaching_periods: 1,
            sub_topics: vec![],
            learning_objectives: vec![],
            key_concepts: vec![],
            teaching_materials: vec![],
            reference_materials: vec![],
            status_hint: hint,
        }
    }

    fn subject(topics: Vec<Topic>) -> Subject {
        Subject {
            id: "s".to_string(),
            academic_year_id: "y".to_string(),
            term_id: "t".to_string(),
            class_id: "c".to_string(),
            name: "Maths".to_string(),
            units: vec![Unit {
                id: "u".to_string(),
                title: "Unit".to_string(),
                topics,
            }],
        }
    }

    fn entry(status: TopicStatus) -> TopicProgress {
        TopicProgress {
            status,
            date_covered: None,
            notes: None,
            updated_at: "0".to_string(),
        }
    }

    #[test]
    fn zero_topics_never_divides() {
        let cov = compute_coverage(&subject(vec![]), &HashMap::new(), &HashMap::new());
        assert_eq!(
            cov,
            Coverage {
                percent: 0,
                completed: 0,
                total: 0
            }
        );
    }

    #[test]
    fn one_of_three_completed_rounds_to_33() {
        let s = subject(vec![topic("a", None), topic("b", None), topic("c", None)]);
        let mut progress = HashMap::new();
        progress.insert("a".to_string(), entry(TopicStatus::Completed));
        progress.insert("b".to_string(), entry(TopicStatus::InProgress));

        let cov = compute_coverage(&s, &progress, &HashMap::new());
        assert_eq!(
            cov,
            Coverage {
                percent: 33,
                completed: 1,
                total: 3
            }
        );
    }

    #[test]
    fn half_rounds_up() {
        // 1 of 8 = 12.5 -> 13
        let s = subject((0..8).map(|i| topic(&format!("t{}", i), None)).collect());
        let mut progress = HashMap::new();
        progress.insert("t0".to_string(), entry(TopicStatus::Completed));
        assert_eq!(compute_coverage(&s, &progress, &HashMap::new()).percent, 13);
    }

    #[test]
    fn explicit_entry_outranks_hint() {
        let s = subject(vec![topic("a", Some(TopicStatus::Completed))]);
        let fallback = fallback_statuses(std::slice::from_ref(&s));
        assert_eq!(
            resolved_status("a", &HashMap::new(), &fallback),
            TopicStatus::Completed
        );

        let mut progress = HashMap::new();
        progress.insert("a".to_string(), entry(TopicStatus::InProgress));
        assert_eq!(
            resolved_status("a", &progress, &fallback),
            TopicStatus::InProgress
        );
    }

    #[test]
    fn unknown_topic_resolves_not_started() {
        assert_eq!(
            resolved_status("missing", &HashMap::new(), &HashMap::new()),
            TopicStatus::NotStarted
        );
    }

    #[test]
    fn fallback_map_covers_every_topic_across_subjects() {
        let s1 = subject(vec![topic("a", Some(TopicStatus::InProgress))]);
        let mut s2 = subject(vec![topic("b", None)]);
        s2.id = "s2".to_string();
        let fallback = fallback_statuses(&[s1, s2]);
        assert_eq!(fallback.get("a"), Some(&TopicStatus::InProgress));
        assert_eq!(fallback.get("b"), Some(&TopicStatus::NotStarted));
    }

    #[test]
    fn completing_a_topic_never_lowers_percent() {
        let s = subject(vec![topic("a", None), topic("b", None), topic("c", None)]);
        let mut progress = HashMap::new();
        progress.insert("a".to_string(), entry(TopicStatus::Completed));
        let before = compute_coverage(&s, &progress, &HashMap::new()).percent;

        for id in ["b", "c"] {
            progress.insert(id.to_string(), entry(TopicStatus::Completed));
            let after = compute_coverage(&s, &progress, &HashMap::new()).percent;
            assert!(after >= before);
        }
    }
}
