// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed workout storage.
//!
//! Workouts are keyed by `(owner, client_workout_id)`, which makes creation
//! idempotent: replaying a create returns the record stored the first time.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use fit_core::{WorkoutFields, WorkoutRecord, WorkoutUnit};

/// SQL schema for the workout database.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS workouts (
    owner TEXT NOT NULL,
    client_workout_id TEXT NOT NULL,
    id TEXT NOT NULL UNIQUE,
    exercise_type TEXT NOT NULL,
    amount REAL NOT NULL,
    unit TEXT NOT NULL,
    performed_at TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    PRIMARY KEY (owner, client_workout_id)
);

CREATE INDEX IF NOT EXISTS idx_workouts_owner_performed
    ON workouts(owner, performed_at);
"#;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("corrupted data in database: {0}")]
    Corrupted(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result of [`WorkoutStore::create`].
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    pub record: WorkoutRecord,
    /// False when the workout already existed.
    pub inserted: bool,
}

pub struct WorkoutStore {
    conn: Connection,
}

impl WorkoutStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(WorkoutStore { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(WorkoutStore { conn })
    }

    /// Store a workout unless `owner` already has one with the same client id.
    pub fn create(&self, owner: &str, fields: &WorkoutFields) -> StoreResult<Created> {
        if let Some(record) = self.get(owner, &fields.client_workout_id)? {
            return Ok(Created {
                record,
                inserted: false,
            });
        }

        let record = WorkoutRecord {
            id: format!("{}-{}", owner, fields.client_workout_id),
            owner: owner.to_string(),
            fields: fields.clone(),
            recorded_at: Utc::now(),
        };
        self.conn.execute(
            "INSERT INTO workouts (owner, client_workout_id, id, exercise_type, amount,
             unit, performed_at, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.owner,
                fields.client_workout_id,
                record.id,
                fields.exercise_type,
                fields.amount,
                fields.unit.as_str(),
                fields.performed_at.to_rfc3339(),
                record.recorded_at.to_rfc3339(),
            ],
        )?;
        Ok(Created {
            record,
            inserted: true,
        })
    }

    /// Delete a workout. Returns whether one existed.
    pub fn delete(&self, owner: &str, client_workout_id: &str) -> StoreResult<bool> {
        let n = self.conn.execute(
            "DELETE FROM workouts WHERE owner = ?1 AND client_workout_id = ?2",
            params![owner, client_workout_id],
        )?;
        Ok(n > 0)
    }

    pub fn get(&self, owner: &str, client_workout_id: &str) -> StoreResult<Option<WorkoutRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE owner = ?1 AND client_workout_id = ?2"),
                params![owner, client_workout_id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// All of `owner`'s workouts, oldest first.
    pub fn list(&self, owner: &str) -> StoreResult<Vec<WorkoutRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE owner = ?1 ORDER BY performed_at, client_workout_id"
        ))?;
        let records = stmt
            .query_map(params![owner], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

const SELECT_COLUMNS: &str = "SELECT id, owner, client_workout_id, exercise_type, amount, unit,
        performed_at, recorded_at FROM workouts";

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkoutRecord> {
    let unit: String = row.get(5)?;
    let performed: String = row.get(6)?;
    let recorded: String = row.get(7)?;
    Ok(WorkoutRecord {
        id: row.get(0)?,
        owner: row.get(1)?,
        fields: WorkoutFields {
            client_workout_id: row.get(2)?,
            exercise_type: row.get(3)?,
            amount: row.get(4)?,
            unit: parse_db::<WorkoutUnit>(&unit, "unit")?,
            performed_at: parse_timestamp(&performed, "performed_at")?,
        },
        recorded_at: parse_timestamp(&recorded, "recorded_at")?,
    })
}

fn parse_db<T: std::str::FromStr>(value: &str, column: &str) -> rusqlite::Result<T> {
    value.parse().map_err(|_| corrupted(value, column))
}

fn parse_timestamp(value: &str, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupted(value, column))
}

fn corrupted(value: &str, column: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(StoreError::Corrupted(format!(
            "invalid value '{value}' in column '{column}'"
        ))),
    )
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
