//! Indian mobile number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input is not exactly ten ASCII digits.
    #[error("phone number must be exactly 10 digits")]
    Length,
    /// The number does not start with 6, 7, 8 or 9.
    #[error("phone number must start with 6, 7, 8 or 9")]
    Prefix,
}

/// A 10-digit Indian mobile number.
///
/// The login endpoint identifies accounts by this number, so it doubles as the
/// username.
///
/// ```
/// use medicare_core::Phone;
///
/// assert!(Phone::parse("9876543210").is_ok());
/// assert!(Phone::parse(" 9876543210 ").is_ok());
/// assert!(Phone::parse("5876543210").is_err());
/// assert!(Phone::parse("98765").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a `Phone`, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError`] if the trimmed input is not ten digits or does
    /// not start with 6-9.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.len() != 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::Length);
        }
        if !matches!(s.as_bytes().first(), Some(b'6'..=b'9')) {
            return Err(PhoneError::Prefix);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_digits() {
        assert_eq!(Phone::parse("98765abcde"), Err(PhoneError::Length));
        assert_eq!(Phone::parse("+919876543210"), Err(PhoneError::Length));
    }

    #[test]
    fn test_rejects_landline_prefix() {
        assert_eq!(Phone::parse("0123456789"), Err(PhoneError::Prefix));
        assert_eq!(Phone::parse("5999999999"), Err(PhoneError::Prefix));
    }

    #[test]
    fn test_accepts_every_mobile_prefix() {
        for prefix in ['6', '7', '8', '9'] {
            let number = format!("{prefix}123456789");
            assert!(Phone::parse(&number).is_ok(), "{number}");
        }
    }
}
