use chrono::NaiveDate;
use serde_json::json;

use crate::coverage::{fallback_statuses, resolved_status};
use crate::curriculum::{find_subject, find_topic};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    db_conn, live_coverage, merged_subjects, now_ts, opt_str_patch, repo, required_str,
    submission_for, term_ended, DEFAULT_THRESHOLD_PERCENT,
};
use crate::ipc::types::{AppState, Request};
use crate::lock::{is_locked, lock_reason};
use crate::model::{TopicProgress, TopicStatus};

fn handle_progress_get(state: &mut AppState, req: &Request) -> serde_json::Value {
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

    let rows: Vec<serde_json::Value> = crate::curriculum::all_topics(subject)
        .iter()
        .map(|t| {
            json!({
                "topicId": t.id,
                "resolvedStatus": resolved_status(&t.id, &progress, &fallback),
                "progress": progress.get(&t.id),
            })
        })
        .collect();

    ok(
        &req.id,
        json!({
            "topics": rows,
            "coverage": live_coverage(subject, &progress, &fallback),
        }),
    )
}

/// The mutator re-checks the lock itself, whatever the calling UI already
/// decided. A locked attempt is a soft refusal, not an error.
fn handle_progress_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let repo = repo(state, conn);

    let subject_id = match required_str(req, "subjectId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let topic_id = match required_str(req, "topicId") {
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
    if find_topic(subject, &topic_id).is_none() {
        return err(&req.id, "not_found", "topic not found in subject", None);
    }

    let ended = match term_ended(&repo, &subject.term_id) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let submission = match submission_for(&repo, subject, DEFAULT_THRESHOLD_PERCENT) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    if is_locked(ended, submission.status) {
        return ok(
            &req.id,
            json!({
                "written": false,
                "locked": true,
                "lockReason": lock_reason(ended, submission.status),
            }),
        );
    }

    let status = match req.params.get("status").and_then(|v| v.as_str()) {
        Some(raw) => match TopicStatus::parse(raw) {
            Some(s) => Some(s),
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    "status must be one of: NOT_STARTED, IN_PROGRESS, COMPLETED",
                    Some(json!({ "status": raw })),
                );
            }
        },
        None => None,
    };

    let date_covered = match opt_str_patch(&req.params, "dateCovered") {
        Ok(p) => p,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    if let crate::ipc::helpers::Patch::Set(ref d) = date_covered {
        if NaiveDate::parse_from_str(d, "%Y-%m-%d").is_err() {
            return err(
                &req.id,
                "bad_params",
                "dateCovered must be an ISO date (YYYY-MM-DD)",
                Some(json!({ "dateCovered": d })),
            );
        }
    }
    let notes = match opt_str_patch(&req.params, "notes") {
        Ok(p) => p,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };

    let mut progress = match repo.progress() {
        Ok(p) => p,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let fallback = fallback_statuses(&subjects);
    let current = progress.get(&topic_id).cloned();
    // A first edit that omits status must not change the resolved status.
    let base_status = current
        .as_ref()
        .map(|p| p.status)
        .unwrap_or_else(|| resolved_status(&topic_id, &progress, &fallback));

    let entry = TopicProgress {
        status: status.unwrap_or(base_status),
        date_covered: date_covered.apply(current.as_ref().and_then(|p| p.date_covered.clone())),
        notes: notes.apply(current.and_then(|p| p.notes)),
        updated_at: now_ts(),
    };
    progress.insert(topic_id.clone(), entry.clone());
    if let Err(e) = repo.save_progress(&progress) {
        return err(&req.id, "db_write_failed", e.to_string(), None);
    }

    ok(
        &req.id,
        json!({
            "written": true,
            "locked": false,
            "topicId": topic_id,
            "progress": entry,
            "coverage": live_coverage(subject, &progress, &fallback),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "progress.get" => Some(handle_progress_get(state, req)),
        "progress.set" => Some(handle_progress_set(state, req)),
        _ => None,
    }
}
