//! Session error types.

use thiserror::Error;

use crate::backend::BackendError;
use crate::error::ValidationErrors;
use crate::storage::RepositoryError;

/// Why a login attempt did not start a session.
#[derive(Debug, Error)]
pub enum LoginFailure {
    /// The phone number or password cannot be submitted.
    #[error("invalid phone number or password format")]
    InvalidInput,

    /// The backend rejected the credentials.
    #[error("{0}")]
    InvalidCredentials(String),

    /// The backend could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The backend failed to process the request.
    #[error("server error: {0}")]
    Server(String),

    /// The backend accepted the login but the session could not be saved.
    #[error("session not saved: {0}")]
    Storage(#[from] RepositoryError),
}

impl LoginFailure {
    /// Message shown for [`LoginFailure::InvalidInput`].
    pub const INVALID_INPUT_MESSAGE: &'static str =
        "Please enter a valid 10-digit phone number and password";

    /// Message used when the backend rejects a login without saying why.
    pub const REJECTED_MESSAGE: &'static str = "Invalid mobile number or password";
}

impl From<BackendError> for LoginFailure {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Http(e) => Self::Network(e.to_string()),
            BackendError::Api { status, message } if (400..500).contains(&status) => {
                if message.trim().is_empty() {
                    Self::InvalidCredentials(Self::REJECTED_MESSAGE.to_string())
                } else {
                    Self::InvalidCredentials(message)
                }
            }
            BackendError::NotFound(_) => {
                Self::InvalidCredentials(Self::REJECTED_MESSAGE.to_string())
            }
            other => Self::Server(other.to_string()),
        }
    }
}

/// Why a signup did not create an account.
#[derive(Debug, Error)]
pub enum SignupError {
    /// One or more form fields are invalid.
    #[error("invalid signup form: {0}")]
    Invalid(#[from] ValidationErrors),

    /// The backend failed to create the account.
    #[error("signup failed: {0}")]
    Backend(#[from] BackendError),

    /// The account exists but the session could not be saved.
    #[error("account created, session not saved: {0}")]
    Session(#[from] RepositoryError),
}
