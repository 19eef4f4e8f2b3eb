use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};

use crate::model::{Subject, Submission, TopicProgress};

pub const DB_FILE: &str = "syllabus.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let conn = Connection::open(workspace.join(DB_FILE))?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv(
            namespace TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY(namespace, key)
        )",
        [],
    )?;
    Ok(())
}

const KEY_CREATED_SUBJECTS: &str = "createdSubjects";
const KEY_PROGRESS: &str = "progress";
const KEY_SUBMISSIONS: &str = "submissions";
const KEY_TERMS_ENDED: &str = "termsEnded";

/// Typed access to the three persisted collections (plus the term-ended
/// override map), stored as JSON documents under an injected key namespace.
/// Whole-collection read-modify-write; single writer per workspace.
pub struct Repository<'a> {
    conn: &'a Connection,
    namespace: String,
}

impl<'a> Repository<'a> {
    pub fn new(conn: &'a Connection, namespace: impl Into<String>) -> Self {
        Self {
            conn,
            namespace: namespace.into(),
        }
    }

    fn get_json(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE namespace = ? AND key = ?",
                (&self.namespace, key),
                |r| r.get(0),
            )
            .optional()?;
        match raw {
            Some(text) => {
                let value = serde_json::from_str(&text)
                    .with_context(|| format!("corrupt JSON under key {}", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_json(&self, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
        self.conn.execute(
            "INSERT INTO kv(namespace, key, value) VALUES(?, ?, ?)
             ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value",
            (&self.namespace, key, serde_json::to_string(value)?),
        )?;
        Ok(())
    }

    fn load<T: serde::de::DeserializeOwned + Default>(&self, key: &str) -> anyhow::Result<T> {
        match self.get_json(key)? {
            Some(value) => serde_json::from_value(value)
                .with_context(|| format!("unexpected shape under key {}", key)),
            None => Ok(T::default()),
        }
    }

    fn save<T: serde::Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        self.set_json(key, &serde_json::to_value(value)?)
    }

    pub fn created_subjects(&self) -> anyhow::Result<Vec<Subject>> {
        self.load(KEY_CREATED_SUBJECTS)
    }

    pub fn save_created_subjects(&self, subjects: &[Subject]) -> anyhow::Result<()> {
        self.save(KEY_CREATED_SUBJECTS, &subjects)
    }

    pub fn progress(&self) -> anyhow::Result<HashMap<String, TopicProgress>> {
        self.load(KEY_PROGRESS)
    }

    pub fn save_progress(&self, progress: &HashMap<String, TopicProgress>) -> anyhow::Result<()> {
        self.save(KEY_PROGRESS, progress)
    }

    pub fn submissions(&self) -> anyhow::Result<HashMap<String, Submission>> {
        self.load(KEY_SUBMISSIONS)
    }

    pub fn save_submissions(
        &self,
        submissions: &HashMap<String, Submission>,
    ) -> anyhow::Result<()> {
        self.save(KEY_SUBMISSIONS, submissions)
    }

    pub fn terms_ended(&self) -> anyhow::Result<HashMap<String, bool>> {
        self.load(KEY_TERMS_ENDED)
    }

    pub fn save_terms_ended(&self, ended: &HashMap<String, bool>) -> anyhow::Result<()> {
        self.save(KEY_TERMS_ENDED, ended)
    }
}
