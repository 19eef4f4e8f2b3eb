use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{db_conn, repo, required_str};
use crate::ipc::types::{AppState, Request};
use crate::seed;

fn handle_years_list(req: &Request) -> serde_json::Value {
    let years = seed::academic_years();
    match serde_json::to_value(&years) {
        Ok(v) => ok(&req.id, json!({ "years": v })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_terms_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let repo = repo(state, conn);

    let ended_overrides = match repo.terms_ended() {
        Ok(m) => m,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let year_filter = req
        .params
        .get("yearId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let terms: Vec<serde_json::Value> = seed::terms()
        .into_iter()
        .filter(|t| {
            year_filter
                .as_deref()
                .map(|y| t.academic_year_id == y)
                .unwrap_or(true)
        })
        .map(|mut t| {
            if let Some(ended) = ended_overrides.get(&t.id) {
                t.ended = *ended;
            }
            serde_json::to_value(&t).unwrap_or_else(|_| json!({}))
        })
        .collect();

    ok(&req.id, json!({ "terms": terms }))
}

fn handle_terms_set_ended(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let repo = repo(state, conn);

    let term_id = match required_str(req, "termId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(ended) = req.params.get("ended").and_then(|v| v.as_bool()) else {
        return err(&req.id, "bad_params", "missing ended (boolean)", None);
    };

    if !seed::terms().iter().any(|t| t.id == term_id) {
        return err(&req.id, "not_found", "term not found", None);
    }

    let mut overrides = match repo.terms_ended() {
        Ok(m) => m,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    overrides.insert(term_id.clone(), ended);
    if let Err(e) = repo.save_terms_ended(&overrides) {
        return err(&req.id, "db_write_failed", e.to_string(), None);
    }

    ok(&req.id, json!({ "termId": term_id, "ended": ended }))
}

fn handle_classes_list(req: &Request) -> serde_json::Value {
    match serde_json::to_value(seed::classes()) {
        Ok(v) => ok(&req.id, json!({ "classes": v })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "years.list" => Some(handle_years_list(req)),
        "terms.list" => Some(handle_terms_list(state, req)),
        "terms.setEnded" => Some(handle_terms_set_ended(state, req)),
        "classes.list" => Some(handle_classes_list(req)),
        _ => None,
    }
}
