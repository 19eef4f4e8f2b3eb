use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::coverage::{fallback_statuses, resolved_status};
use crate::curriculum::{all_topics, find_subject, validate_new_subject};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    db_conn, live_coverage, merged_subjects, repo, required_str, submission_for, term_ended,
    DEFAULT_THRESHOLD_PERCENT,
};
use crate::ipc::types::{AppState, Request};
use crate::lock::{is_locked, lock_reason};
use crate::model::{Subject, Topic, Unit};
use crate::seed;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicInput {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    teaching_periods: Option<i64>,
    #[serde(default)]
    sub_topics: Vec<String>,
    #[serde(default)]
    learning_objectives: Vec<String>,
    #[serde(default)]
    key_concepts: Vec<String>,
    #[serde(default)]
    teaching_materials: Vec<String>,
    #[serde(default)]
    reference_materials: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitInput {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    topics: Vec<TopicInput>,
}

fn build_subject(req: &Request, year_id: String, term_id: String, class_id: String, name: String) -> Result<Subject, serde_json::Value> {
    let unit_inputs: Vec<UnitInput> = match req.params.get("units") {
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(u) => u,
            Err(e) => return Err(err(&req.id, "bad_params", format!("invalid units: {}", e), None)),
        },
        None => Vec::new(),
    };

    let units = unit_inputs
        .into_iter()
        .map(|u| Unit {
            id: u.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: u.title.trim().to_string(),
            topics: u
                .topics
                .into_iter()
                .map(|t| Topic {
                    id: t.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    title: t.title.trim().to_string(),
                    // Missing teachingPeriods fails validation below the 1 floor.
                    teaching_periods: t.teaching_periods.unwrap_or(0),
                    sub_topics: t.sub_topics,
                    learning_objectives: t.learning_objectives,
                    key_concepts: t.key_concepts,
                    teaching_materials: t.teaching_materials,
                    reference_materials: t.reference_materials,
                    // Created topics never carry a status hint.
                    status_hint: None,
                })
                .collect(),
        })
        .collect();

    Ok(Subject {
        id: req
            .params
            .get("id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        academic_year_id: year_id,
        term_id,
        class_id,
        name: name.trim().to_string(),
        units,
    })
}

fn handle_subjects_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let repo = repo(state, conn);

    let year_id = match required_str(req, "yearId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let term_id = match required_str(req, "termId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let mut errors = std::collections::HashMap::new();
    if !seed::academic_years().iter().any(|y| y.id == year_id) {
        errors.insert("yearId".to_string(), "unknown academic year".to_string());
    }
    if !seed::terms()
        .iter()
        .any(|t| t.id == term_id && t.academic_year_id == year_id)
    {
        errors.insert(
            "termId".to_string(),
            "unknown term for this academic year".to_string(),
        );
    }
    if !seed::classes().iter().any(|c| c.id == class_id) {
        errors.insert("classId".to_string(), "unknown class".to_string());
    }

    let draft = match build_subject(req, year_id, term_id, class_id, name) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let existing = match merged_subjects(&repo) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    // A create that reuses an existing id is an intentional whole-subject
    // override; exclude that record from the duplicate-name check.
    let others: Vec<_> = existing
        .iter()
        .filter(|s| s.id != draft.id)
        .cloned()
        .collect();
    errors.extend(validate_new_subject(&others, &draft));

    if !errors.is_empty() {
        return err(
            &req.id,
            "validation_failed",
            "subject validation failed",
            Some(json!({ "fields": errors })),
        );
    }

    let mut created = match repo.created_subjects() {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    created.retain(|s| s.id != draft.id);
    created.push(draft.clone());
    if let Err(e) = repo.save_created_subjects(&created) {
        return err(&req.id, "db_write_failed", e.to_string(), None);
    }

    ok(
        &req.id,
        json!({
            "subjectId": draft.id,
            "name": draft.name,
            "unitCount": draft.units.len(),
            "topicCount": all_topics(&draft).len(),
        }),
    )
}

fn handle_subjects_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let repo = repo(state, conn);

    let subjects = match merged_subjects(&repo) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let progress = match repo.progress() {
        Ok(p) => p,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let fallback = fallback_statuses(&subjects);

    let filter = |key: &str| {
        req.params
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };
    let (year, term, class) = (filter("yearId"), filter("termId"), filter("classId"));

    let rows: Vec<serde_json::Value> = subjects
        .iter()
        .filter(|s| year.as_deref().map(|v| s.academic_year_id == v).unwrap_or(true))
        .filter(|s| term.as_deref().map(|v| s.term_id == v).unwrap_or(true))
        .filter(|s| class.as_deref().map(|v| s.class_id == v).unwrap_or(true))
        .map(|s| {
            let cov = live_coverage(s, &progress, &fallback);
            json!({
                "id": s.id,
                "name": s.name,
                "yearId": s.academic_year_id,
                "termId": s.term_id,
                "classId": s.class_id,
                "unitCount": s.units.len(),
                "topicCount": cov.total,
                "coverage": cov,
            })
        })
        .collect();

    ok(&req.id, json!({ "subjects": rows }))
}

fn handle_subjects_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let repo = repo(state, conn);

    let subject_id = match required_str(req, "subjectId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let subjects = match merged_subjects(&repo) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let Some(subject) = find_subject(&subjects, &subject_id) else {
        return err(&req.id, "not_found", "subject not found", None);
    };

    let progress = match repo.progress() {
        Ok(p) => p,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let fallback = fallback_statuses(&subjects);
    let cov = live_coverage(subject, &progress, &fallback);

    let submission = match submission_for(&repo, subject, DEFAULT_THRESHOLD_PERCENT) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let ended = match term_ended(&repo, &subject.term_id) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let topics: Vec<serde_json::Value> = subject
        .units
        .iter()
        .map(|u| {
            let rows: Vec<serde_json::Value> = u
                .topics
                .iter()
                .map(|t| {
                    json!({
                        "topic": t,
                        "resolvedStatus": resolved_status(&t.id, &progress, &fallback),
                        "progress": progress.get(&t.id),
                    })
                })
                .collect();
            json!({ "id": u.id, "title": u.title, "topics": rows })
        })
        .collect();

    ok(
        &req.id,
        json!({
            "subject": {
                "id": subject.id,
                "name": subject.name,
                "yearId": subject.academic_year_id,
                "termId": subject.term_id,
                "classId": subject.class_id,
            },
            "units": topics,
            "coverage": cov,
            "termEnded": ended,
            "submissionStatus": submission.status,
            "locked": is_locked(ended, submission.status),
            "lockReason": lock_reason(ended, submission.status),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.list" => Some(handle_subjects_list(state, req)),
        "subjects.get" => Some(handle_subjects_get(state, req)),
        "subjects.create" => Some(handle_subjects_create(state, req)),
        _ => None,
    }
}
