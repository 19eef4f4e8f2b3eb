use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    /// Key namespace for the persisted collections, injected at workspace
    /// selection time.
    pub namespace: String,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            db: None,
            namespace: "syllabus".to_string(),
        }
    }
}
