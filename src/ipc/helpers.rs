use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use serde_json::{json, Value as JsonValue};

use crate::coverage::{self, Coverage};
use crate::curriculum;
use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::model::{Subject, Submission, TopicProgress, TopicStatus};
use crate::seed;
use crate::store::Repository;
use crate::workflow;

pub const DEFAULT_THRESHOLD_PERCENT: i64 = 70;

pub fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, JsonValue> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn repo<'a>(state: &'a AppState, conn: &'a Connection) -> Repository<'a> {
    Repository::new(conn, state.namespace.clone())
}

pub fn required_str(req: &Request, key: &str) -> Result<String, JsonValue> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// Missing key keeps the current value; explicit null clears it.
pub fn opt_str_patch(params: &JsonValue, key: &str) -> Result<Patch<String>, String> {
    match params.get(key) {
        None => Ok(Patch::Keep),
        Some(v) if v.is_null() => Ok(Patch::Clear),
        Some(v) => {
            let s = v
                .as_str()
                .ok_or_else(|| format!("{} must be a string or null", key))?
                .trim()
                .to_string();
            if s.is_empty() {
                Ok(Patch::Clear)
            } else {
                Ok(Patch::Set(s))
            }
        }
    }
}

pub enum Patch<T> {
    Keep,
    Set(T),
    Clear,
}

impl<T> Patch<T> {
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Keep => current,
            Patch::Set(v) => Some(v),
            Patch::Clear => None,
        }
    }
}

pub fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn merged_subjects(repo: &Repository) -> anyhow::Result<Vec<Subject>> {
    let created = repo.created_subjects()?;
    Ok(curriculum::merge_subjects(&seed::subjects(), &created))
}

/// Baseline terms never start ended; the persisted override map is the
/// administrative toggle. Unknown term ids read as not ended.
pub fn term_ended(repo: &Repository, term_id: &str) -> anyhow::Result<bool> {
    Ok(repo.terms_ended()?.get(term_id).copied().unwrap_or(false))
}

/// The current submission for a subject, or the lazily-created DRAFT default
/// when the composite key has never been touched. Does not persist.
pub fn submission_for(
    repo: &Repository,
    subject: &Subject,
    threshold: i64,
) -> anyhow::Result<Submission> {
    let key = subject.submission_key();
    if let Some(existing) = repo.submissions()?.remove(&key) {
        return Ok(existing);
    }
    Ok(workflow::default_submission(
        &subject.academic_year_id,
        &subject.term_id,
        &subject.class_id,
        &subject.id,
        threshold,
        &now_ts(),
    ))
}

pub fn live_coverage(
    subject: &Subject,
    progress: &HashMap<String, TopicProgress>,
    fallback: &HashMap<String, TopicStatus>,
) -> Coverage {
    coverage::compute_coverage(subject, progress, fallback)
}

pub fn submission_json(sub: &Submission) -> JsonValue {
    serde_json::to_value(sub).unwrap_or_else(|_| json!({}))
}
