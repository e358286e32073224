//! SQLite schema for persisted state (spec §6).
//!
//! The `plans`, `phases`, `dreyfus_assessments`, `katas` and
//! `learning_materials` tables are created here but this crate only
//! exposes read accessors for them: their write paths belong to
//! collaborators outside this process's scope (the coaching-kata/PR/
//! commit-message pipelines and the Dreyfus-assessment engine).

use rusqlite::Connection;

use paige_error::PaigeError;

pub fn init_schema(conn: &Connection) -> Result<(), PaigeError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;",
    )
    .map_err(|e| PaigeError::Storage {
        message: format!("pragma init failed: {e}"),
    })?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY,
            project_dir TEXT NOT NULL,
            status TEXT NOT NULL,
            started_at TEXT NOT NULL,
            ended_at TEXT,
            issue_number INTEGER,
            issue_title TEXT,
            branch_name TEXT,
            stash_name TEXT
        );

        CREATE TABLE IF NOT EXISTS action_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL REFERENCES sessions(id),
            action_type TEXT NOT NULL,
            data_json TEXT,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_action_log_session ON action_log(session_id);
        CREATE INDEX IF NOT EXISTS idx_action_log_session_type ON action_log(session_id, action_type);

        CREATE TABLE IF NOT EXISTS api_call_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL REFERENCES sessions(id),
            call_type TEXT NOT NULL,
            model TEXT NOT NULL,
            input_hash TEXT,
            latency_ms INTEGER NOT NULL,
            input_tokens INTEGER NOT NULL,
            output_tokens INTEGER NOT NULL,
            cost_estimate REAL NOT NULL,
            succeeded INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_api_call_log_session ON api_call_log(session_id);

        CREATE TABLE IF NOT EXISTS plans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL REFERENCES sessions(id),
            title TEXT NOT NULL,
            summary TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS phases (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            plan_id INTEGER NOT NULL REFERENCES plans(id),
            number INTEGER NOT NULL,
            title TEXT NOT NULL,
            status TEXT NOT NULL,
            summary TEXT
        );

        CREATE TABLE IF NOT EXISTS dreyfus_assessments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL REFERENCES sessions(id),
            skill_area TEXT NOT NULL,
            level TEXT NOT NULL,
            evidence_json TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS katas (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL REFERENCES sessions(id),
            title TEXT NOT NULL,
            prompt TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS learning_materials (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL REFERENCES sessions(id),
            title TEXT NOT NULL,
            url TEXT,
            created_at TEXT NOT NULL
        );",
    )
    .map_err(|e| PaigeError::Storage {
        message: format!("schema init failed: {e}"),
    })?;

    Ok(())
}
