use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("invalid id string: {0}")]
    InvalidId(String),
    #[error("migration error: {0}")]
    Migration(String),
    #[error("invalid database url: {0:?}")]
    InvalidDatabaseUrl(String),
    #[error("duplicate phone: {0}")]
    DuplicatePhone(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Io,
    Sql,
    InvalidId,
    Migration,
    InvalidDatabaseUrl,
    DuplicatePhone,
    Unavailable,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Io(_) => StoreErrorKind::Io,
            StoreError::Sql(_) => StoreErrorKind::Sql,
            StoreError::InvalidId(_) => StoreErrorKind::InvalidId,
            StoreError::Migration(_) => StoreErrorKind::Migration,
            StoreError::InvalidDatabaseUrl(_) => StoreErrorKind::InvalidDatabaseUrl,
            StoreError::DuplicatePhone(_) => StoreErrorKind::DuplicatePhone,
            StoreError::Unavailable(_) => StoreErrorKind::Unavailable,
        }
    }

    pub fn is_duplicate_phone(&self) -> bool {
        self.kind() == StoreErrorKind::DuplicatePhone
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreError, StoreErrorKind};

    #[test]
    fn only_duplicate_phone_counts_as_duplicate() {
        let duplicate = StoreError::DuplicatePhone("0712345678".to_string());
        assert_eq!(duplicate.kind(), StoreErrorKind::DuplicatePhone);
        assert!(duplicate.is_duplicate_phone());

        let offline = StoreError::Unavailable("connection lost".to_string());
        assert_eq!(offline.kind(), StoreErrorKind::Unavailable);
        assert!(!offline.is_duplicate_phone());
    }
}
