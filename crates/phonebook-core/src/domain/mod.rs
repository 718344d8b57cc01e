pub mod error_record;
pub mod ids;
pub mod person;
pub mod phone;

pub use error_record::ErrorRecord;
pub use ids::{ErrorRecordId, PersonId};
pub use person::{Person, PersonNew};
pub use phone::{classify_phone, PhoneClass, PhoneNumber};
