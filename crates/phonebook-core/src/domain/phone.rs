use crate::error::CoreError;
use serde::Serialize;
use std::fmt;

const TRUNK_PREFIX: &str = "0";
const SUBSCRIBER_DIGITS: usize = 8;

/// How a raw phone string relates to the national mobile format `07XXXXXXXX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneClass {
    /// `07` followed by eight digits; stored as given.
    Canonical,
    /// `7` followed by eight digits; the trunk `0` was left off.
    MissingTrunkPrefix,
    Invalid,
}

/// Classifies `raw` without trimming or stripping anything. Only ASCII
/// digits count as digits.
pub fn classify_phone(raw: &str) -> PhoneClass {
    let bytes = raw.as_bytes();
    if !bytes.iter().all(u8::is_ascii_digit) {
        return PhoneClass::Invalid;
    }

    match bytes {
        [b'0', b'7', rest @ ..] if rest.len() == SUBSCRIBER_DIGITS => PhoneClass::Canonical,
        [b'7', rest @ ..] if rest.len() == SUBSCRIBER_DIGITS => PhoneClass::MissingTrunkPrefix,
        _ => PhoneClass::Invalid,
    }
}

/// A phone number in canonical national form. The only way to get one is
/// [`PhoneNumber::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match classify_phone(raw) {
            PhoneClass::Canonical => Ok(Self(raw.to_string())),
            PhoneClass::MissingTrunkPrefix => Ok(Self(format!("{TRUNK_PREFIX}{raw}"))),
            PhoneClass::Invalid => Err(CoreError::InvalidPhoneFormat(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_phone, PhoneClass, PhoneNumber};
    use crate::error::CoreError;

    #[test]
    fn classify_accepts_canonical_numbers() {
        for raw in ["0712345678", "0700000000", "0799999999"] {
            assert_eq!(classify_phone(raw), PhoneClass::Canonical, "{raw}");
        }
    }

    #[test]
    fn classify_detects_missing_trunk_prefix() {
        for raw in ["712345678", "700000000", "799999999"] {
            assert_eq!(classify_phone(raw), PhoneClass::MissingTrunkPrefix, "{raw}");
        }
    }

    #[test]
    fn classify_rejects_everything_else() {
        for raw in [
            "",
            "12345",
            "07123456789",
            "071234567",
            "0612345678",
            "612345678",
            "7123456789",
            "07123-5678",
            "+40712345678",
            " 0712345678",
            "0712345678\n",
            "07１2345678",
            "abcdefghij",
        ] {
            assert_eq!(classify_phone(raw), PhoneClass::Invalid, "{raw:?}");
        }
    }

    #[test]
    fn parse_keeps_canonical_numbers_unchanged() {
        let phone = PhoneNumber::parse("0798765432").expect("canonical");
        assert_eq!(phone.as_str(), "0798765432");
    }

    #[test]
    fn parse_prepends_trunk_prefix() {
        let phone = PhoneNumber::parse("712345678").expect("missing prefix");
        assert_eq!(phone.as_str(), "0712345678");
        assert_eq!(phone.as_str().len(), 10);
    }

    #[test]
    fn parse_reports_the_rejected_value() {
        let err = PhoneNumber::parse("12345").unwrap_err();
        assert_eq!(err, CoreError::InvalidPhoneFormat("12345".to_string()));
    }
}
