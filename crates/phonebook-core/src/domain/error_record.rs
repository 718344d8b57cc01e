use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic snapshot of an unexpected failure and the input that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub occurred_at: String,
    pub message: String,
    pub input: String,
}

impl ErrorRecord {
    pub fn capture<T>(occurred_at: DateTime<Utc>, error: &dyn fmt::Display, input: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        let input = serde_json::to_string(input)
            .unwrap_or_else(|err| format!("<unserializable input: {err}>"));
        Self {
            occurred_at: occurred_at.to_rfc3339(),
            message: error.to_string(),
            input,
        }
    }
}
