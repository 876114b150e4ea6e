use anyhow::Context;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::grading::StudentRecord;

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("marksheet.sqlite3");
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshots(
            key TEXT PRIMARY KEY,
            records TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

/// Persistence key for one school's sheet.
pub fn snapshot_key(school: &str) -> String {
    format!("students_{}", school)
}

/// Overwrite the saved sheet for a school. Called after every accepted
/// edit, so the stored snapshot always matches the in-memory records.
pub fn snapshot_save(
    conn: &Connection,
    school: &str,
    records: &[StudentRecord],
) -> anyhow::Result<()> {
    let json = serde_json::to_string(records).context("encode snapshot")?;
    conn.execute(
        "INSERT INTO snapshots(key, records, updated_at)
         VALUES(?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET
           records = excluded.records,
           updated_at = excluded.updated_at",
        (snapshot_key(school), json, Utc::now().to_rfc3339()),
    )?;
    Ok(())
}

/// Prior-session sheet for a school, or None when nothing was saved.
/// A snapshot that no longer decodes is an error, not an empty sheet.
pub fn snapshot_load(conn: &Connection, school: &str) -> anyhow::Result<Option<Vec<StudentRecord>>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT records FROM snapshots WHERE key = ?",
            [snapshot_key(school)],
            |r| r.get(0),
        )
        .optional()?;
    let Some(json) = json else {
        return Ok(None);
    };
    let records: Vec<StudentRecord> = serde_json::from_str(&json)
        .with_context(|| format!("decode snapshot {}", snapshot_key(school)))?;
    Ok(Some(records))
}
