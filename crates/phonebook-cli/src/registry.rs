use crate::messages;
use crate::shared::SharedStore;
use crate::sink::ErrorSink;
use chrono::Utc;
use phonebook_core::{BatchPayload, BatchReport, ErrorRecord, Person, PersonInput, PersonNew};
use phonebook_store::error::{Result as StoreResult, StoreError};
use phonebook_store::repo::BatchInsert;
use serde::Serialize;
use std::borrow::Cow;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};


/// Persistence operations the registry needs. Uniqueness of `phone` is the
/// implementation's job; callers never pre-check.
pub trait PhoneRepository: Send + Sync {
    fn list_phones(&self) -> StoreResult<Vec<String>>;
    fn insert_one(&self, now_utc: i64, person: &PersonNew) -> StoreResult<Person>;
    fn insert_many(&self, now_utc: i64, people: &[PersonNew]) -> StoreResult<BatchInsert>;
}

impl PhoneRepository for SharedStore {
    fn list_phones(&self) -> StoreResult<Vec<String>> {
        self.with(|store| store.persons().list_phones())
    }

    fn insert_one(&self, now_utc: i64, person: &PersonNew) -> StoreResult<Person> {
        self.with(|store| store.persons().insert_one(now_utc, person))
    }

    fn insert_many(&self, now_utc: i64, people: &[PersonNew]) -> StoreResult<BatchInsert> {
        self.with(|store| store.persons().insert_many(now_utc, people))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOneReply {
    Saved,
    AlreadyExists,
    InvalidFormat,
    ErrorRecorded,
}

impl AddOneReply {
    pub fn outcome(&self) -> &'static str {
        match self {
            AddOneReply::Saved => "saved",
            AddOneReply::AlreadyExists => "already_exists",
            AddOneReply::InvalidFormat => "invalid_format",
            AddOneReply::ErrorRecorded => "error_recorded",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AddOneReply::Saved => messages::SAVED,
            AddOneReply::AlreadyExists => messages::ALREADY_EXISTS,
            AddOneReply::InvalidFormat => messages::INVALID_FORMAT,
            AddOneReply::ErrorRecorded => messages::ERROR_RECORDED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddManyReply {
    Saved(BatchReport),
    ErrorRecorded(BatchReport),
}

impl AddManyReply {
    pub fn outcome(&self) -> &'static str {
        match self {
            AddManyReply::Saved(_) => "saved",
            AddManyReply::ErrorRecorded(_) => "error_recorded",
        }
    }

    pub fn report(&self) -> &BatchReport {
        match self {
            AddManyReply::Saved(report) | AddManyReply::ErrorRecorded(report) => report,
        }
    }

    pub fn message(&self) -> Cow<'static, str> {
        match self {
            AddManyReply::Saved(report) => Cow::Owned(messages::batch_saved(report)),
            AddManyReply::ErrorRecorded(report) => Cow::Owned(messages::batch_failed(report)),
        }
    }
}

/// The three registry operations, independent of transport.
pub struct Registry {
    repository: Arc<dyn PhoneRepository>,
    sink: Arc<dyn ErrorSink>,
    pending: Mutex<JoinSet<()>>,
}

impl Registry {
    pub fn new(repository: Arc<dyn PhoneRepository>, sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            repository,
            sink,
            pending: Mutex::new(JoinSet::new()),
        }
    }

    pub async fn list_phones(&self) -> StoreResult<Vec<String>> {
        let result = self.run_repository(|repo| repo.list_phones()).await;
        if let Err(err) = &result {
            self.record_failure(err, &());
        }
        result
    }

    pub async fn add_one(&self, input: &PersonInput) -> AddOneReply {
        let person = match input.build() {
            Ok(person) => person,
            Err(err) => {
                debug!(error = %err, "entry rejected");
                return AddOneReply::InvalidFormat;
            }
        };

        let phone = person.phone.to_string();
        let result = self
            .run_repository(move |repo| repo.insert_one(now_utc(), &person))
            .await;
        match result {
            Ok(_) => {
                debug!(%phone, "entry saved");
                AddOneReply::Saved
            }
            Err(err) if err.is_duplicate_phone() => {
                debug!(%phone, "entry already exists");
                AddOneReply::AlreadyExists
            }
            Err(err) => {
                self.record_failure(&err, input);
                AddOneReply::ErrorRecorded
            }
        }
    }

    pub async fn add_many(&self, payload: &BatchPayload) -> AddManyReply {
        let built = payload.build();
        let mut report = BatchReport {
            received: built.received,
            rejected_invalid: built.rejected_invalid,
            ..BatchReport::default()
        };
        if built.people.is_empty() {
            debug!(received = report.received, "batch had no valid entries");
            return AddManyReply::Saved(report);
        }

        let attempted = built.people.len();
        let people = built.people;
        let result = self
            .run_repository(move |repo| repo.insert_many(now_utc(), &people))
            .await;
        match result {
            Ok(outcome) => {
                report.inserted = outcome.inserted;
                report.rejected_by_store = outcome.rejected;
                debug!(
                    received = report.received,
                    inserted = report.inserted,
                    rejected_invalid = report.rejected_invalid,
                    rejected_by_store = report.rejected_by_store,
                    "batch saved"
                );
                AddManyReply::Saved(report)
            }
            Err(err) => {
                report.rejected_by_store = attempted;
                self.record_failure(&err, payload);
                AddManyReply::ErrorRecorded(report)
            }
        }
    }

    /// Waits for every recording started so far.
    pub async fn flush_errors(&self) {
        let mut pending = {
            let mut guard = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };
        while pending.join_next().await.is_some() {}
    }

    async fn run_repository<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn PhoneRepository) -> StoreResult<T> + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        tokio::task::spawn_blocking(move || op(repository.as_ref()))
            .await
            .map_err(|err| StoreError::Unavailable(format!("repository task failed: {err}")))?
    }

    fn record_failure<T>(&self, err: &StoreError, input: &T)
    where
        T: Serialize + ?Sized,
    {
        error!(error = %err, "storage failure");
        let record = ErrorRecord::capture(Utc::now(), err, input);
        let sink = Arc::clone(&self.sink);

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        while pending.try_join_next().is_some() {}
        pending.spawn(async move {
            if let Err(err) = sink.record(record).await {
                warn!(error = %err, "failed to record error");
            }
        });
    }
}

fn now_utc() -> i64 {
    Utc::now().timestamp()
}
