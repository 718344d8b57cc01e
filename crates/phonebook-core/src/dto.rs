use crate::domain::PersonNew;
use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::borrow::Cow;

/// Phone value as clients send it. Some clients send the number as a JSON
/// integer; anything else is kept so it can be reported back as invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPhone {
    Text(String),
    Number(Number),
    Other(Value),
}

impl RawPhone {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            RawPhone::Text(text) => Cow::Borrowed(text),
            RawPhone::Number(number) => Cow::Owned(number.to_string()),
            RawPhone::Other(value) => Cow::Owned(value.to_string()),
        }
    }
}

impl From<&str> for RawPhone {
    fn from(value: &str) -> Self {
        RawPhone::Text(value.to_string())
    }
}

/// One entry. Older clients send `nume` / `telefon` instead of `name` /
/// `phone`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonInput {
    #[serde(
        default,
        alias = "nume",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(default, alias = "telefon", skip_serializing_if = "Option::is_none")]
    pub phone: Option<RawPhone>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
}

/// Accepts any JSON value for a free-text field. Non-string values keep
/// their JSON text; `null` means absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    };
    Ok(text)
}

impl PersonInput {
    pub fn build(&self) -> Result<PersonNew, CoreError> {
        let Some(phone) = self.phone.as_ref() else {
            return Err(CoreError::InvalidPhoneFormat(String::new()));
        };
        PersonNew::build(self.name.as_deref(), &phone.as_text(), self.email.as_deref())
    }
}

/// One element of a bulk submission: either a full entry or a bare phone.
/// Every JSON object parses as `Person`, so only non-objects reach `Phone`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Person(PersonInput),
    Phone(RawPhone),
}

impl BatchEntry {
    pub fn build(&self) -> Result<PersonNew, CoreError> {
        match self {
            BatchEntry::Person(input) => input.build(),
            BatchEntry::Phone(phone) => PersonNew::build(None, &phone.as_text(), None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberList {
    #[serde(alias = "numere")]
    pub numbers: Vec<BatchEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyEnvelope {
    #[serde(rename = "nameValuePairs")]
    pub name_value_pairs: NumberList,
}

/// Accepted shapes of a bulk submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchPayload {
    Entries(Vec<BatchEntry>),
    Wrapped(NumberList),
    Legacy(LegacyEnvelope),
}

impl BatchPayload {
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        Self::from_slice(raw.as_bytes())
    }

    pub fn from_slice(raw: &[u8]) -> Result<Self, CoreError> {
        serde_json::from_slice(raw).map_err(|err| CoreError::InvalidBatchPayload(err.to_string()))
    }

    pub fn entries(&self) -> &[BatchEntry] {
        match self {
            BatchPayload::Entries(entries) => entries,
            BatchPayload::Wrapped(list) => &list.numbers,
            BatchPayload::Legacy(envelope) => &envelope.name_value_pairs.numbers,
        }
    }

    /// Builds every entry independently. Entries that fail are only counted.
    pub fn build(&self) -> BuiltBatch {
        let entries = self.entries();
        let mut people = Vec::with_capacity(entries.len());
        let mut rejected_invalid = 0;
        for entry in entries {
            match entry.build() {
                Ok(person) => people.push(person),
                Err(_) => rejected_invalid += 1,
            }
        }
        BuiltBatch {
            received: entries.len(),
            people,
            rejected_invalid,
        }
    }
}

impl From<Vec<BatchEntry>> for BatchPayload {
    fn from(entries: Vec<BatchEntry>) -> Self {
        BatchPayload::Entries(entries)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltBatch {
    pub received: usize,
    pub people: Vec<PersonNew>,
    pub rejected_invalid: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub received: usize,
    pub inserted: usize,
    pub rejected_invalid: usize,
    pub rejected_by_store: usize,
}

impl BatchReport {
    pub fn not_saved(&self) -> usize {
        self.rejected_invalid + self.rejected_by_store
    }
}
