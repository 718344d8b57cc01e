pub mod db;
pub mod error;
pub mod migrate;
pub mod paths;
pub mod repo;

use crate::error::Result;
use crate::paths::DatabaseLocation;
use rusqlite::Connection;
use std::path::Path;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = db::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Opens the database named by a configured URL, creating the parent
    /// directory of file databases when missing.
    pub fn connect(url: &str) -> Result<Self> {
        match DatabaseLocation::parse(url)? {
            DatabaseLocation::Memory => Self::open_in_memory(),
            DatabaseLocation::File(path) => {
                paths::ensure_parent_dir(&path)?;
                Self::open(&path)
            }
        }
    }

    pub fn migrate(&self) -> Result<()> {
        migrate::run_migrations(&self.conn)
    }

    pub fn schema_version(&self) -> Result<i64> {
        migrate::schema_version(&self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn persons(&self) -> repo::PersonsRepo<'_> {
        repo::PersonsRepo::new(&self.conn)
    }

    pub fn error_logs(&self) -> repo::ErrorLogsRepo<'_> {
        repo::ErrorLogsRepo::new(&self.conn)
    }
}
