use crate::error::{Result, StoreError};
use rusqlite::{Connection, OptionalExtension, Transaction};

const MIGRATIONS: &[(&str, &str)] = &[("001_init.sql", include_str!("../migrations/001_init.sql"))];

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    ensure_schema_table(&tx)?;
    let current = read_version(&tx)?;
    let available = MIGRATIONS.len() as i64;

    if current > available {
        return Err(StoreError::Migration(format!(
            "db version {current} newer than available migrations {available}"
        )));
    }

    for (version, (_name, sql)) in (1_i64..).zip(MIGRATIONS.iter()) {
        if current >= version {
            continue;
        }
        tx.execute_batch(sql)?;
        set_version(&tx, version)?;
    }

    tx.commit()?;
    Ok(())
}

pub fn schema_version(conn: &Connection) -> Result<i64> {
    let version: Option<i64> = conn
        .query_row("SELECT version FROM phonebook_schema LIMIT 1;", [], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(version.unwrap_or(0))
}

fn ensure_schema_table(tx: &Transaction<'_>) -> Result<()> {
    tx.execute_batch("CREATE TABLE IF NOT EXISTS phonebook_schema (version INTEGER NOT NULL);")?;
    let existing: Option<i64> = tx
        .query_row("SELECT version FROM phonebook_schema LIMIT 1;", [], |row| {
            row.get(0)
        })
        .optional()?;
    if existing.is_none() {
        tx.execute("INSERT INTO phonebook_schema (version) VALUES (0);", [])?;
    }
    Ok(())
}

fn read_version(tx: &Transaction<'_>) -> Result<i64> {
    let version = tx.query_row("SELECT version FROM phonebook_schema LIMIT 1;", [], |row| {
        row.get(0)
    })?;
    Ok(version)
}

fn set_version(tx: &Transaction<'_>, version: i64) -> Result<()> {
    let updated = tx.execute("UPDATE phonebook_schema SET version = ?1;", [version])?;
    if updated != 1 {
        return Err(StoreError::Migration(format!(
            "expected single schema row, updated {updated}"
        )));
    }
    Ok(())
}
