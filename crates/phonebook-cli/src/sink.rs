use crate::shared::SharedStore;
use async_trait::async_trait;
use phonebook_config::ErrorSinkConfig;
use phonebook_core::ErrorRecord;
use phonebook_store::error::StoreError;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("sink task failed: {0}")]
    Task(String),
}

/// Destination for unexpected failures. Callers do not wait on the outcome
/// before answering their own client.
#[async_trait]
pub trait ErrorSink: Send + Sync {
    async fn record(&self, record: ErrorRecord) -> Result<(), SinkError>;
}

pub fn build_sink(config: &ErrorSinkConfig, store: &SharedStore) -> Arc<dyn ErrorSink> {
    match config {
        ErrorSinkConfig::Store => Arc::new(StoreErrorSink::new(store.clone())),
        ErrorSinkConfig::File(path) => Arc::new(FileErrorSink::new(path.clone())),
    }
}

/// Appends records to the `error_logs` table.
pub struct StoreErrorSink {
    store: SharedStore,
}

impl StoreErrorSink {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ErrorSink for StoreErrorSink {
    async fn record(&self, record: ErrorRecord) -> Result<(), SinkError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            store.with(|store| store.error_logs().append(&record))
        })
        .await
        .map_err(|err| SinkError::Task(err.to_string()))??;
        Ok(())
    }
}

/// Appends one JSON object per line to a log file.
pub struct FileErrorSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileErrorSink {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl ErrorSink for FileErrorSink {
    async fn record(&self, record: ErrorRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorSink, FileErrorSink, StoreErrorSink};
    use crate::shared::SharedStore;
    use phonebook_core::ErrorRecord;
    use phonebook_store::Store;
    use tempfile::TempDir;

    fn record(message: &str) -> ErrorRecord {
        ErrorRecord {
            occurred_at: "2030-01-15T12:00:00+00:00".to_string(),
            message: message.to_string(),
            input: r#"{"phone":"0712345678"}"#.to_string(),
        }
    }

    #[tokio::test]
    async fn file_sink_appends_json_lines() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("logs").join("errors.log");
        let sink = FileErrorSink::new(path.clone());

        sink.record(record("first")).await.expect("record first");
        sink.record(record("second")).await.expect("record second");

        let contents = std::fs::read_to_string(&path).expect("read log");
        let lines: Vec<ErrorRecord> = contents
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].message, "first");
        assert_eq!(lines[1].message, "second");
        assert_eq!(lines[1].input, r#"{"phone":"0712345678"}"#);
    }

    #[tokio::test]
    async fn store_sink_writes_error_logs() {
        let store = Store::open_in_memory().expect("open in memory");
        store.migrate().expect("migrate");
        let shared = SharedStore::new(store);
        let sink = StoreErrorSink::new(shared.clone());

        sink.record(record("disk full")).await.expect("record");

        let entries = shared
            .with(|store| store.error_logs().list_recent(10))
            .expect("list");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record.message, "disk full");
    }
}
