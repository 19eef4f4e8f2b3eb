use std::path::PathBuf;

use serde_json::json;

use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::store;

fn workspace_path(state: &AppState, req: &Request) -> Result<PathBuf, serde_json::Value> {
    state
        .workspace
        .clone()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let workspace = match workspace_path(state, req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let out_path = match required_str(req, "outPath") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };

    match backup::export_workspace_bundle(&workspace, &out_path) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "bundleFormat": summary.bundle_format,
                "dbSha256": summary.db_sha256,
                "outPath": out_path.to_string_lossy(),
            }),
        ),
        Err(e) => err(&req.id, "db_write_failed", format!("{e:?}"), None),
    }
}

fn handle_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let workspace = match workspace_path(state, req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let in_path = match required_str(req, "inPath") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };

    // Close the open connection before the database file is replaced.
    state.db = None;

    let imported = match backup::import_workspace_bundle(&in_path, &workspace) {
        Ok(summary) => summary,
        Err(e) => {
            // Reopen whatever is on disk so the session stays usable.
            state.db = store::open_db(&workspace).ok();
            return err(&req.id, "db_write_failed", format!("{e:?}"), None);
        }
    };

    match store::open_db(&workspace) {
        Ok(conn) => {
            state.db = Some(conn);
            ok(
                &req.id,
                json!({ "bundleFormatDetected": imported.bundle_format_detected }),
            )
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "workspace.exportBundle" => Some(handle_export(state, req)),
        "workspace.importBundle" => Some(handle_import(state, req)),
        _ => None,
    }
}
