use std::collections::HashMap;

use crate::model::{Subject, Topic};

/// Id-keyed upsert: baseline first, then created. A created subject sharing
/// an id with a baseline subject replaces it entirely, never field-merges.
/// Baseline order is preserved; created-only subjects append in their order.
pub fn merge_subjects(baseline: &[Subject], created: &[Subject]) -> Vec<Subject> {
    let mut by_id: HashMap<String, Subject> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for s in baseline.iter().chain(created.iter()) {
        if !by_id.contains_key(&s.id) {
            order.push(s.id.clone());
        }
        by_id.insert(s.id.clone(), s.clone());
    }

    order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}

/// Flattens units in order, then topics in order within each unit. This
/// ordering defines the iteration order everywhere coverage is computed;
/// keep it stable so percentages reproduce across screens.
pub fn all_topics(subject: &Subject) -> Vec<&Topic> {
    subject
        .units
        .iter()
        .flat_map(|u| u.topics.iter())
        .collect()
}

pub fn find_subject<'a>(subjects: &'a [Subject], id: &str) -> Option<&'a Subject> {
    subjects.iter().find(|s| s.id == id)
}

pub fn find_topic<'a>(subject: &'a Subject, topic_id: &str) -> Option<&'a Topic> {
    subject
        .units
        .iter()
        .flat_map(|u| u.topics.iter())
        .find(|t| t.id == topic_id)
}

/// Validates a subject before insertion. Returns a field -> message map;
/// empty map means valid. All checks run, nothing is written here.
pub fn validate_new_subject(existing: &[Subject], draft: &Subject) -> HashMap<String, String> {
    let mut errors: HashMap<String, String> = HashMap::new();

    if draft.name.trim().is_empty() {
        errors.insert("name".to_string(), "subject name is required".to_string());
    } else {
        let duplicate = existing.iter().any(|s| {
            s.academic_year_id == draft.academic_year_id
                && s.term_id == draft.term_id
                && s.class_id == draft.class_id
                && s.name.trim().eq_ignore_ascii_case(draft.name.trim())
        });
        if duplicate {
            errors.insert(
                "name".to_string(),
                "a subject with this name already exists for this year, term and class"
                    .to_string(),
            );
        }
    }

    if draft.units.is_empty() {
        errors.insert("units".to_string(), "at least one unit is required".to_string());
    }

    for (ui, unit) in draft.units.iter().enumerate() {
        if unit.title.trim().is_empty() {
            errors.insert(
                format!("units[{}].title", ui),
                "unit title is required".to_string(),
            );
        }
        for (ti, topic) in unit.topics.iter().enumerate() {
            if topic.title.trim().is_empty() {
                errors.insert(
                    format!("units[{}].topics[{}].title", ui, ti),
                    "topic title is required".to_string(),
                );
            }
            if topic.teaching_periods < 1 {
                errors.insert(
                    format!("units[{}].topics[{}].teachingPeriods", ui, ti),
                    "teaching periods must be at least 1".to_string(),
                );
            }
        }
    }

    errors
}
