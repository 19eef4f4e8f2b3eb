use serde_json::json;

use crate::coverage::fallback_statuses;
use crate::curriculum::find_subject;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    db_conn, live_coverage, merged_subjects, now_ts, repo, required_str, submission_for,
    submission_json, term_ended, DEFAULT_THRESHOLD_PERCENT,
};
use crate::ipc::types::{AppState, Request};
use crate::lock::{is_locked, lock_reason};
use crate::model::{Subject, SubmissionStatus};
use crate::store::Repository;
use crate::workflow;

fn threshold_param(req: &Request) -> Result<i64, serde_json::Value> {
    match req.params.get("requiredThresholdPercent") {
        None => Ok(DEFAULT_THRESHOLD_PERCENT),
        Some(v) if v.is_null() => Ok(DEFAULT_THRESHOLD_PERCENT),
        Some(v) => match v.as_i64() {
            Some(n) if (0..=100).contains(&n) => Ok(n),
            _ => Err(err(
                &req.id,
                "bad_params",
                "requiredThresholdPercent must be an integer in 0..=100",
                None,
            )),
        },
    }
}

fn subject_for<'a>(
    req: &Request,
    subjects: &'a [Subject],
) -> Result<&'a Subject, serde_json::Value> {
    let subject_id = required_str(req, "subjectId")?;
    find_subject(subjects, &subject_id)
        .ok_or_else(|| err(&req.id, "not_found", "subject not found", None))
}

fn handle_syllabus_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let repo = repo(state, conn);

    let subjects = match merged_subjects(&repo) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let subject = match subject_for(req, &subjects) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let threshold = match threshold_param(req) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    let submission = match submission_for(&repo, subject, threshold) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    // First access creates the DRAFT record for this composite key.
    let mut all = match repo.submissions() {
        Ok(m) => m,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if !all.contains_key(&submission.id) {
        all.insert(submission.id.clone(), submission.clone());
        if let Err(e) = repo.save_submissions(&all) {
            return err(&req.id, "db_write_failed", e.to_string(), None);
        }
    }

    let progress = match repo.progress() {
        Ok(p) => p,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let fallback = fallback_statuses(&subjects);
    let cov = live_coverage(subject, &progress, &fallback);
    let ended = match term_ended(&repo, &subject.term_id) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    ok(
        &req.id,
        json!({
            "submission": submission_json(&submission),
            "liveCoverage": cov,
            "belowThreshold": cov.percent < submission.required_threshold_percent,
            "termEnded": ended,
            "locked": is_locked(ended, submission.status),
            "lockReason": lock_reason(ended, submission.status),
        }),
    )
}

fn handle_syllabus_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let repo = repo(state, conn);

    let subjects = match merged_subjects(&repo) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let subject = match subject_for(req, &subjects) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let threshold = match threshold_param(req) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let declaration_accepted = req
        .params
        .get("declarationAccepted")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let current = match submission_for(&repo, subject, threshold) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let progress = match repo.progress() {
        Ok(p) => p,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let fallback = fallback_statuses(&subjects);
    let cov = live_coverage(subject, &progress, &fallback);

    let next = match workflow::submit(&current, &cov, declaration_accepted, &now_ts()) {
        Ok(s) => s,
        Err(e) => return err(&req.id, e.code, e.message, None),
    };

    if let Err(e) = replace_submission(&repo, &next) {
        return err(&req.id, "db_write_failed", e.to_string(), None);
    }

    // Below-threshold submission is allowed; the flag is a caller-side warning.
    ok(
        &req.id,
        json!({
            "submission": submission_json(&next),
            "belowThreshold": next.coverage_percent_at_submit < next.required_threshold_percent,
        }),
    )
}

fn handle_syllabus_review(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let repo = repo(state, conn);

    let subjects = match merged_subjects(&repo) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let subject = match subject_for(req, &subjects) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let action = match required_str(req, "action") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let current = match submission_for(&repo, subject, DEFAULT_THRESHOLD_PERCENT) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let result = match action.as_str() {
        "approve" => workflow::approve(&current, &now_ts()),
        "reject" => {
            let comment = req
                .params
                .get("comment")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            workflow::reject(&current, comment, &now_ts())
        }
        other => {
            return err(
                &req.id,
                "bad_params",
                "action must be approve or reject",
                Some(json!({ "action": other })),
            );
        }
    };

    let next = match result {
        Ok(s) => s,
        Err(e) => return err(&req.id, e.code, e.message, None),
    };

    if let Err(e) = replace_submission(&repo, &next) {
        return err(&req.id, "db_write_failed", e.to_string(), None);
    }

    ok(&req.id, json!({ "submission": submission_json(&next) }))
}

fn handle_bulk_approve(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let repo = repo(state, conn);

    let keys: Vec<String> = match req.params.get("keys").and_then(|v| v.as_array()) {
        Some(arr) => arr
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect(),
        None => return err(&req.id, "bad_params", "missing keys (array)", None),
    };

    let mut all = match repo.submissions() {
        Ok(m) => m,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let now = now_ts();
    let mut approved: Vec<String> = Vec::new();
    let mut skipped: Vec<String> = Vec::new();
    for key in keys {
        match all.get(&key) {
            Some(current) if current.status == SubmissionStatus::Submitted => {
                match workflow::approve(current, &now) {
                    Ok(next) => {
                        all.insert(key.clone(), next);
                        approved.push(key);
                    }
                    // Unreachable given the status check; skip rather than fail the batch.
                    Err(_) => skipped.push(key),
                }
            }
            _ => skipped.push(key),
        }
    }

    if let Err(e) = repo.save_submissions(&all) {
        return err(&req.id, "db_write_failed", e.to_string(), None);
    }

    ok(
        &req.id,
        json!({
            "approvedCount": approved.len(),
            "approvedKeys": approved,
            "skippedKeys": skipped,
        }),
    )
}

/// Administrative override from any state, including APPROVED. Gated behind
/// an explicit confirmation flag so a plain UI action cannot trip it.
fn handle_reset_to_draft(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let repo = repo(state, conn);

    let subjects = match merged_subjects(&repo) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let subject = match subject_for(req, &subjects) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    if req.params.get("confirm").and_then(|v| v.as_bool()) != Some(true) {
        return err(
            &req.id,
            "bad_params",
            "resetToDraft is an administrative override and requires confirm: true",
            None,
        );
    }

    let current = match submission_for(&repo, subject, DEFAULT_THRESHOLD_PERCENT) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let next = workflow::reset_to_draft(&current, &now_ts());

    if let Err(e) = replace_submission(&repo, &next) {
        return err(&req.id, "db_write_failed", e.to_string(), None);
    }

    ok(&req.id, json!({ "submission": submission_json(&next) }))
}

/// Whole-record replacement: the map never holds a partially updated
/// submission.
fn replace_submission(
    repo: &Repository,
    next: &crate::model::Submission,
) -> anyhow::Result<()> {
    let mut all = repo.submissions()?;
    all.insert(next.id.clone(), next.clone());
    repo.save_submissions(&all)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "syllabus.get" => Some(handle_syllabus_get(state, req)),
        "syllabus.submit" => Some(handle_syllabus_submit(state, req)),
        "syllabus.review" => Some(handle_syllabus_review(state, req)),
        "syllabus.bulkApprove" => Some(handle_bulk_approve(state, req)),
        "syllabus.resetToDraft" => Some(handle_reset_to_draft(state, req)),
        _ => None,
    }
}
