use crate::domain::ids::PersonId;
use crate::domain::phone::PhoneNumber;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// A stored registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: i64,
}

/// A validated entry that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonNew {
    pub name: String,
    pub email: String,
    pub phone: PhoneNumber,
}

impl PersonNew {
    /// Missing `name` and `email` become empty strings. Fails only when the
    /// phone does not classify as a national mobile number.
    pub fn build(name: Option<&str>, phone: &str, email: Option<&str>) -> Result<Self, CoreError> {
        let phone = PhoneNumber::parse(phone)?;
        Ok(Self {
            name: name.unwrap_or_default().to_string(),
            email: email.unwrap_or_default().to_string(),
            phone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::PersonNew;
    use crate::error::CoreError;

    #[test]
    fn build_defaults_missing_fields_to_empty() {
        let person = PersonNew::build(None, "0712345678", None).expect("build");
        assert_eq!(person.name, "");
        assert_eq!(person.email, "");
        assert_eq!(person.phone.as_str(), "0712345678");
    }

    #[test]
    fn build_keeps_supplied_fields() {
        let person =
            PersonNew::build(Some("Ada"), "712345678", Some("ada@example.com")).expect("build");
        assert_eq!(person.name, "Ada");
        assert_eq!(person.email, "ada@example.com");
        assert_eq!(person.phone.as_str(), "0712345678");
    }

    #[test]
    fn build_rejects_invalid_phone() {
        let err = PersonNew::build(Some("Ada"), "12345", None).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPhoneFormat(_)));
    }
}
