//! Postal delivery code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pincode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PincodeError {
    /// The input is empty after trimming.
    #[error("pincode cannot be empty")]
    Empty,
    /// The input is not a six digit code starting with 1-9.
    #[error("pincode must be 6 digits and cannot start with 0")]
    Format,
}

/// Estimated delivery window for a pincode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryEstimate {
    /// Northern postal zones (pincodes starting with 1 or 2).
    TwoToThreeDays,
    /// Everywhere else.
    ThreeToFiveDays,
}

impl fmt::Display for DeliveryEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TwoToThreeDays => "2-3 days",
            Self::ThreeToFiveDays => "3-5 days",
        })
    }
}

/// A six digit Indian postal code.
///
/// ```
/// use medicare_core::{DeliveryEstimate, Pincode};
///
/// let pin = Pincode::parse(" 110001 ").unwrap();
/// assert_eq!(pin.as_str(), "110001");
/// assert_eq!(pin.delivery_estimate(), DeliveryEstimate::TwoToThreeDays);
/// assert!(Pincode::parse("011001").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Parse a `Pincode`, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PincodeError::Empty`] for blank input and
    /// [`PincodeError::Format`] for anything that is not six digits with a
    /// non-zero first digit.
    pub fn parse(s: &str) -> Result<Self, PincodeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PincodeError::Empty);
        }
        let well_formed = s.len() == 6
            && s.bytes().all(|b| b.is_ascii_digit())
            && !s.starts_with('0');
        if !well_formed {
            return Err(PincodeError::Format);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Delivery window promised for this code.
    #[must_use]
    pub fn delivery_estimate(&self) -> DeliveryEstimate {
        if self.0.starts_with('1') || self.0.starts_with('2') {
            DeliveryEstimate::TwoToThreeDays
        } else {
            DeliveryEstimate::ThreeToFiveDays
        }
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Pincode {
    type Err = PincodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
