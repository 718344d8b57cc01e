use crate::error::{Result, StoreError};
use std::fs;
use std::path::{Path, PathBuf};

const SQLITE_SCHEME: &str = "sqlite://";
const FILE_SCHEME: &str = "file:";
const MEMORY_NAMES: [&str; 2] = [":memory:", "sqlite::memory:"];

/// Where the database lives, as named by the configured database url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl DatabaseLocation {
    /// Accepts `:memory:`, `sqlite::memory:`, `sqlite://<path>`,
    /// `file:<path>` or a bare filesystem path.
    pub fn parse(url: &str) -> Result<Self> {
        let trimmed = url.trim();
        if MEMORY_NAMES.contains(&trimmed) {
            return Ok(Self::Memory);
        }

        let path = trimmed
            .strip_prefix(SQLITE_SCHEME)
            .or_else(|| trimmed.strip_prefix(FILE_SCHEME))
            .unwrap_or(trimmed);
        if path.is_empty() {
            return Err(StoreError::InvalidDatabaseUrl(url.to_string()));
        }
        Ok(Self::File(PathBuf::from(path)))
    }
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) else {
        return Ok(());
    };
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        restrict_dir_permissions(dir)?;
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_dir_permissions(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir_permissions(_dir: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_parent_dir, DatabaseLocation};
    use crate::error::StoreError;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn parse_recognizes_memory_urls() {
        assert_eq!(
            DatabaseLocation::parse(":memory:").unwrap(),
            DatabaseLocation::Memory
        );
        assert_eq!(
            DatabaseLocation::parse("sqlite::memory:").unwrap(),
            DatabaseLocation::Memory
        );
    }

    #[test]
    fn parse_strips_known_schemes() {
        assert_eq!(
            DatabaseLocation::parse("sqlite:///var/lib/phonebook.sqlite3").unwrap(),
            DatabaseLocation::File(PathBuf::from("/var/lib/phonebook.sqlite3"))
        );
        assert_eq!(
            DatabaseLocation::parse("file:data/phonebook.sqlite3").unwrap(),
            DatabaseLocation::File(PathBuf::from("data/phonebook.sqlite3"))
        );
        assert_eq!(
            DatabaseLocation::parse("phonebook.sqlite3").unwrap(),
            DatabaseLocation::File(PathBuf::from("phonebook.sqlite3"))
        );
    }

    #[test]
    fn parse_rejects_empty_paths() {
        for url in ["", "   ", "sqlite://", "file:"] {
            let err = DatabaseLocation::parse(url).unwrap_err();
            assert!(matches!(err, StoreError::InvalidDatabaseUrl(_)), "{url:?}");
        }
    }

    #[test]
    fn ensure_parent_dir_creates_missing_directories() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("nested").join("dir").join("db.sqlite3");
        ensure_parent_dir(&path).expect("create parent");
        assert!(path.parent().unwrap().is_dir());
    }
}
