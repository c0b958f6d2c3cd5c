//! Display language selection.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A storefront display language.
///
/// Persisted as its two-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// Hindi.
    Hi,
    /// Marathi.
    Mr,
}

impl Locale {
    /// Two-letter language code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Mr => "mr",
        }
    }

    /// Parse a stored language code; `None` for anything unknown.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "en" => Some(Self::En),
            "hi" => Some(Self::Hi),
            "mr" => Some(Self::Mr),
            _ => None,
        }
    }

    /// Map a language picker choice to a locale.
    ///
    /// Accepts the display names and codes for English and Hindi; every
    /// other choice selects Marathi, the remaining option in the picker.
    #[must_use]
    pub fn from_choice(choice: &str) -> Self {
        match choice.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Self::En,
            "hindi" | "hi" => Self::Hi,
            _ => Self::Mr,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_choice() {
        assert_eq!(Locale::from_choice("English"), Locale::En);
        assert_eq!(Locale::from_choice("Hindi"), Locale::Hi);
        assert_eq!(Locale::from_choice("Marathi"), Locale::Mr);
        assert_eq!(Locale::from_choice("anything"), Locale::Mr);
    }

    #[test]
    fn test_code_roundtrip() {
        for locale in [Locale::En, Locale::Hi, Locale::Mr] {
            assert_eq!(Locale::from_code(locale.code()), Some(locale));
        }
        assert_eq!(Locale::from_code("fr"), None);
    }
}
