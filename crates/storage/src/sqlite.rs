// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite backing store
//!
//! Connection-per-call: every operation opens its own connection, so a
//! checkpoint worker holding a clone never shares a handle with the live
//! engine.

use crate::store::{BackingStore, StoreError};
use me_core::{is_valid_table_name, OperationLogEntry, Row, SliceHistoryEntry};
use rusqlite::{params, Connection, OpenFlags, TransactionBehavior};
use std::path::{Path, PathBuf};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS slice_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    time INTEGER NOT NULL,
    end_id INTEGER NOT NULL
);
"#;

/// Backing store on a single SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Open the database at path, creating it and the history table if necessary
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Connection {
                target: path.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        let store = Self { path };
        store
            .conn()?
            .execute_batch(SCHEMA)
            .map_err(query("initialize schema"))?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a connection with WAL mode and busy timeout
    fn conn(&self) -> Result<Connection, StoreError> {
        let connection_error = |e: rusqlite::Error| StoreError::Connection {
            target: self.path.display().to_string(),
            reason: e.to_string(),
        };

        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(connection_error)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA busy_timeout = 5000;
        ",
        )
        .map_err(connection_error)?;

        Ok(conn)
    }

    fn exists(conn: &Connection, table: &str) -> Result<bool, StoreError> {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count > 0)
        .map_err(query(format!("check table {}", table)))
    }
}

impl BackingStore for SqliteStore {
    fn table_exists(&self, table: &str) -> Result<bool, StoreError> {
        validate(table)?;
        Self::exists(&self.conn()?, table)
    }

    fn read_partition(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        validate(table)?;
        let conn = self.conn()?;
        if !Self::exists(&conn, table)? {
            return Err(StoreError::TableNotFound(table.to_string()));
        }

        let context = format!("read {}", table);
        let mut stmt = conn
            .prepare(&format!("SELECT payload FROM {} ORDER BY seq", table))
            .map_err(query(&context))?;
        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(query(&context))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query(&context))?;

        payloads
            .iter()
            .map(|payload| serde_json::from_str(payload).map_err(payload_error(table)))
            .collect()
    }

    fn write_partition(&self, table: &str, rows: &[Row]) -> Result<(), StoreError> {
        validate(table)?;
        let mut conn = self.conn()?;
        let context = format!("write {}", table);

        // IMMEDIATE takes the write lock up front so a concurrent operlog
        // append waits on busy_timeout instead of failing the upgrade
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(query(&context))?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table};
             CREATE TABLE {table} (seq INTEGER PRIMARY KEY, payload TEXT NOT NULL);"
        ))
        .map_err(query(&context))?;
        {
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT INTO {} (seq, payload) VALUES (?1, ?2)",
                    table
                ))
                .map_err(query(&context))?;
            for (seq, row) in rows.iter().enumerate() {
                let payload = serde_json::to_string(row).map_err(payload_error(table))?;
                stmt.execute(params![seq as i64, payload])
                    .map_err(query(&context))?;
            }
        }
        tx.commit().map_err(query(&context))
    }

    fn read_operlog(
        &self,
        table: &str,
        after_id: u64,
    ) -> Result<Vec<OperationLogEntry>, StoreError> {
        validate(table)?;
        let conn = self.conn()?;
        if !Self::exists(&conn, table)? {
            return Err(StoreError::TableNotFound(table.to_string()));
        }

        let context = format!("read {}", table);
        let mut stmt = conn
            .prepare(&format!(
                "SELECT id, time, detail FROM {} WHERE id > ?1 ORDER BY id ASC",
                table
            ))
            .map_err(query(&context))?;
        let raw = stmt
            .query_map([to_sql_id(after_id)], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(query(&context))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query(&context))?;

        raw.into_iter()
            .map(|(id, time, detail)| -> Result<OperationLogEntry, StoreError> {
                Ok(OperationLogEntry {
                    id: id as u64,
                    time,
                    detail: serde_json::from_str(&detail).map_err(payload_error(table))?,
                })
            })
            .collect()
    }

    fn append_operlog(&self, table: &str, entry: &OperationLogEntry) -> Result<(), StoreError> {
        validate(table)?;
        let conn = self.conn()?;
        let context = format!("append {}", table);
        let detail = serde_json::to_string(&entry.detail).map_err(payload_error(table))?;

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY,
                time INTEGER NOT NULL,
                detail TEXT NOT NULL
            );",
            table
        ))
        .map_err(query(&context))?;
        conn.execute(
            &format!("INSERT INTO {} (id, time, detail) VALUES (?1, ?2, ?3)", table),
            params![to_sql_id(entry.id), entry.time, detail],
        )
        .map_err(query(&context))?;
        Ok(())
    }

    fn latest_slice(&self) -> Result<Option<SliceHistoryEntry>, StoreError> {
        let conn = self.conn()?;
        let result = conn.query_row(
            "SELECT id, time, end_id FROM slice_history ORDER BY id DESC LIMIT 1",
            [],
            slice_from_row,
        );

        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(query("read latest slice_history")(e)),
        }
    }

    fn insert_slice(
        &self,
        timestamp: i64,
        end_operation_id: u64,
    ) -> Result<SliceHistoryEntry, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO slice_history (time, end_id) VALUES (?1, ?2)",
            params![timestamp, to_sql_id(end_operation_id)],
        )
        .map_err(query("insert slice_history"))?;

        Ok(SliceHistoryEntry {
            id: conn.last_insert_rowid() as u64,
            timestamp,
            end_operation_id,
        })
    }

    fn list_slices(&self, limit: usize) -> Result<Vec<SliceHistoryEntry>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, time, end_id FROM slice_history ORDER BY id DESC LIMIT ?1")
            .map_err(query("list slice_history"))?;
        let rows = stmt
            .query_map([i64::try_from(limit).unwrap_or(i64::MAX)], slice_from_row)
            .map_err(query("list slice_history"))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(query("list slice_history"))
    }
}

fn slice_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SliceHistoryEntry> {
    Ok(SliceHistoryEntry {
        id: row.get::<_, i64>(0)? as u64,
        timestamp: row.get(1)?,
        end_operation_id: row.get::<_, i64>(2)? as u64,
    })
}

fn validate(table: &str) -> Result<(), StoreError> {
    if is_valid_table_name(table) {
        Ok(())
    } else {
        Err(StoreError::InvalidTable(table.to_string()))
    }
}

fn to_sql_id(id: u64) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}

fn query(context: impl Into<String>) -> impl FnOnce(rusqlite::Error) -> StoreError {
    let context = context.into();
    move |source| StoreError::Query { context, source }
}

fn payload_error(table: &str) -> impl Fn(serde_json::Error) -> StoreError + '_ {
    move |source| StoreError::Payload {
        table: table.to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
