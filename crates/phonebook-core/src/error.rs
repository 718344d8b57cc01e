use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid phone format: {0:?}")]
    InvalidPhoneFormat(String),
    #[error("invalid batch payload: {0}")]
    InvalidBatchPayload(String),
}
