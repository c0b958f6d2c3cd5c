//! Delivery pincode and display language.

use medicare_core::{DeliveryEstimate, Locale, Pincode};
use tracing::{instrument, warn};

use crate::error::ValidationErrors;
use crate::storage::{Repository, RepositoryError, keys};

/// Shown when a pincode does not validate.
pub const INVALID_PINCODE_MESSAGE: &str = "Please enter a valid 6-digit Indian pincode.";

/// Errors saving a preference.
#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// User preferences kept in the durable store.
#[derive(Debug, Clone)]
pub struct Preferences {
    repo: Repository,
}

impl Preferences {
    #[must_use]
    pub const fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Validate and save a delivery pincode.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::Invalid`] for a malformed pincode, leaving
    /// the saved one in place.
    #[instrument(skip(self))]
    pub fn set_pincode(&self, raw: &str) -> Result<DeliveryEstimate, PreferenceError> {
        let pincode = Pincode::parse(raw)
            .map_err(|_| ValidationErrors::single("pincode", INVALID_PINCODE_MESSAGE))?;
        self.repo.save_text(keys::PINCODE, pincode.as_str())?;
        Ok(pincode.delivery_estimate())
    }

    /// The saved pincode, if it is still valid.
    #[must_use]
    pub fn pincode(&self) -> Option<Pincode> {
        let raw = self.repo.load_text(keys::PINCODE).ok().flatten()?;
        Pincode::parse(&raw)
            .inspect_err(|_| warn!(pincode = %raw, "Ignoring invalid stored pincode"))
            .ok()
    }

    /// Save the display language.
    ///
    /// Accepts a language name or code; see [`Locale::from_choice`].
    ///
    /// # Errors
    ///
    /// Returns an error if the language cannot be persisted.
    #[instrument(skip(self))]
    pub fn set_language(&self, choice: &str) -> Result<Locale, PreferenceError> {
        let locale = Locale::from_choice(choice);
        self.repo.save_text(keys::LANGUAGE, locale.code())?;
        Ok(locale)
    }

    /// The saved display language, English when unset or unreadable.
    #[must_use]
    pub fn language(&self) -> Locale {
        self.repo
            .load_text(keys::LANGUAGE)
            .ok()
            .flatten()
            .and_then(|code| Locale::from_code(&code))
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pincode_saved_with_estimate() {
        let prefs = Preferences::new(Repository::in_memory());
        assert_eq!(
            prefs.set_pincode(" 110001 ").unwrap(),
            DeliveryEstimate::TwoToThreeDays
        );
        assert_eq!(
            prefs.set_pincode("411001").unwrap(),
            DeliveryEstimate::ThreeToFiveDays
        );
        assert_eq!(prefs.pincode().unwrap().as_str(), "411001");
    }

    #[test]
    fn test_invalid_pincode_keeps_previous() {
        let prefs = Preferences::new(Repository::in_memory());
        prefs.set_pincode("400001").unwrap();

        let err = prefs.set_pincode("012345").unwrap_err();
        let PreferenceError::Invalid(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("pincode"), Some(INVALID_PINCODE_MESSAGE));
        assert_eq!(prefs.pincode().unwrap().as_str(), "400001");
    }

    #[test]
    fn test_language_mapping_and_default() {
        let repo = Repository::in_memory();
        let prefs = Preferences::new(repo.clone());
        assert_eq!(prefs.language(), Locale::En);

        assert_eq!(prefs.set_language("Hindi").unwrap(), Locale::Hi);
        assert_eq!(prefs.language(), Locale::Hi);
        assert_eq!(prefs.set_language("मराठी").unwrap(), Locale::Mr);
        assert_eq!(repo.load_text(keys::LANGUAGE).unwrap().as_deref(), Some("mr"));

        repo.save_text(keys::LANGUAGE, "fr").unwrap();
        assert_eq!(prefs.language(), Locale::En);
    }
}
