//! Unified error handling.
//!
//! Provides a unified `AppError` type for every command. [`AppError::notice`]
//! decides how a failure is surfaced to the user and hides internal detail.

use core::fmt;

use thiserror::Error;

use crate::backend::BackendError;
use crate::services::preferences::PreferenceError;
use crate::services::prescription::{CaptureError, PrescriptionError};
use crate::services::session::{LoginFailure, SignupError};
use crate::storage::RepositoryError;

// =============================================================================
// Validation
// =============================================================================

/// A validation message attached to one input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name, e.g. `email` or `pincode`.
    pub field: &'static str,
    /// Message to show next to the field.
    pub message: String,
}

/// Per-field validation failures collected from one form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// An empty error set.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// A set holding a single field error.
    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Record an error for `field`.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first message recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// All recorded errors in the order they were found.
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.errors
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if any error was recorded.
    pub fn into_result<T>(self, value: T) -> std::result::Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// AppError
// =============================================================================

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Persisted state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] RepositoryError),

    /// Backend API operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Login was rejected or could not complete.
    #[error("Login failed: {0}")]
    Login(#[from] LoginFailure),

    /// One or more inputs were invalid.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A prescription file could not be read.
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Requested product does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Requested product cannot be ordered.
    #[error("Out of stock: {0}")]
    OutOfStock(String),

    /// The command is not valid in the current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A new account was created but could not be logged into.
    #[error("Session error: {0}")]
    Session(RepositoryError),
}

impl From<SignupError> for AppError {
    fn from(err: SignupError) -> Self {
        match err {
            SignupError::Invalid(errors) => Self::Validation(errors),
            SignupError::Backend(err) => Self::Backend(err),
            SignupError::Session(err) => Self::Session(err),
        }
    }
}

impl From<PrescriptionError> for AppError {
    fn from(err: PrescriptionError) -> Self {
        match err {
            PrescriptionError::Invalid(errors) => Self::Validation(errors),
            PrescriptionError::Storage(err) => Self::Storage(err),
        }
    }
}

impl From<PreferenceError> for AppError {
    fn from(err: PreferenceError) -> Self {
        match err {
            PreferenceError::Invalid(errors) => Self::Validation(errors),
            PreferenceError::Storage(err) => Self::Storage(err),
        }
    }
}

/// How a failure is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Shown next to the offending fields; nothing was committed.
    Inline,
    /// Non-blocking message; the affected view is degraded.
    Alert,
    /// Blocking message the user must dismiss.
    Blocking,
    /// Logged only.
    Log,
}

/// A user-facing description of a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    /// Field errors for [`Severity::Inline`] notices.
    pub fields: Vec<FieldError>,
}

impl Notice {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            fields: Vec::new(),
        }
    }
}

impl AppError {
    /// Map the error to the notice shown to the user.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Validation(errors) => Notice {
                severity: Severity::Inline,
                message: errors
                    .fields()
                    .first()
                    .map_or_else(String::new, |e| e.message.clone()),
                fields: errors.fields().to_vec(),
            },
            Self::Login(LoginFailure::InvalidInput) => Notice {
                severity: Severity::Inline,
                message: LoginFailure::INVALID_INPUT_MESSAGE.to_string(),
                fields: vec![FieldError {
                    field: "phone",
                    message: LoginFailure::INVALID_INPUT_MESSAGE.to_string(),
                }],
            },
            Self::Login(LoginFailure::InvalidCredentials(message)) => {
                Notice::new(Severity::Inline, message.clone())
            }
            Self::Login(LoginFailure::Network(_)) => Notice::new(
                Severity::Alert,
                "Unable to reach the server. Please check your connection and try again.",
            ),
            Self::Login(LoginFailure::Server(_)) => Notice::new(
                Severity::Alert,
                "Login failed due to a server error. Please try again later.",
            ),
            Self::Login(LoginFailure::Storage(_)) => Notice::new(
                Severity::Alert,
                "Could not start your session. Please try again.",
            ),
            Self::Session(_) => Notice::new(
                Severity::Alert,
                "Your account was created. Please log in to continue.",
            ),
            Self::NotFound(_) => Notice::new(Severity::Blocking, "Product not found"),
            Self::OutOfStock(_) => Notice::new(Severity::Blocking, "Product is out of stock"),
            Self::Backend(err) if err.is_network() => Notice::new(
                Severity::Alert,
                "Unable to reach the server. Please try again.",
            ),
            Self::Backend(_) => Notice::new(Severity::Alert, "Something went wrong. Please try again."),
            Self::Capture(_) => Notice::new(
                Severity::Alert,
                "Could not read the selected file. Please choose another file.",
            ),
            Self::InvalidState(message) => Notice::new(Severity::Alert, message.clone()),
            Self::Storage(_) => Notice::new(Severity::Log, "Could not save your changes."),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
