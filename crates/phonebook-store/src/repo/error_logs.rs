use crate::error::{Result, StoreError};
use phonebook_core::domain::{ErrorRecord, ErrorRecordId};
use rusqlite::{params, Connection};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLogEntry {
    pub id: ErrorRecordId,
    pub record: ErrorRecord,
}

pub struct ErrorLogsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ErrorLogsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn append(&self, record: &ErrorRecord) -> Result<ErrorRecordId> {
        let id = ErrorRecordId::new();
        self.conn.execute(
            "INSERT INTO error_logs (id, occurred_at, message, input) VALUES (?1, ?2, ?3, ?4);",
            params![id.to_string(), record.occurred_at, record.message, record.input],
        )?;
        Ok(id)
    }

    /// Most recent first.
    pub fn list_recent(&self, limit: i64) -> Result<Vec<ErrorLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, occurred_at, message, input
             FROM error_logs
             ORDER BY rowid DESC
             LIMIT ?1;",
        )?;
        let mut rows = stmt.query([limit])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let id_str: String = row.get(0)?;
            let id = ErrorRecordId::from_str(&id_str)
                .map_err(|_| StoreError::InvalidId(id_str.clone()))?;
            entries.push(ErrorLogEntry {
                id,
                record: ErrorRecord {
                    occurred_at: row.get(1)?,
                    message: row.get(2)?,
                    input: row.get(3)?,
                },
            });
        }
        Ok(entries)
    }
}
