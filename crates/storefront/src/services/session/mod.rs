//! Login session.
//!
//! A session is a `loggedInUser` record in the session-scoped store. It is
//! valid for 24 hours after login; expiry is detected when the record is read
//! rather than by a timer.

mod error;

pub use error::{LoginFailure, SignupError};

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::backend::{AccountApi, BackendError, BackendUser};
use crate::error::ValidationErrors;
use crate::models::{Credentials, SessionRecord, SessionState, SignupForm};
use crate::storage::{Repository, RepositoryError, keys};

/// Backend message for a signup with a registered email.
const EMAIL_EXISTS: &str = "Email already exists";

/// Manages the login session.
#[derive(Debug, Clone)]
pub struct SessionManager {
    repo: Repository,
}

impl SessionManager {
    /// Create a manager over the session-scoped store.
    #[must_use]
    pub const fn new(repo: Repository) -> Self {
        Self { repo }
    }

    // =========================================================================
    // Login / Signup
    // =========================================================================

    /// Log in with a phone number and password.
    ///
    /// Nothing is stored unless the backend accepts the credentials.
    ///
    /// # Errors
    ///
    /// Returns a [`LoginFailure`] describing why no session was started.
    #[instrument(skip(self, api, credentials))]
    pub async fn login<A: AccountApi>(
        &self,
        api: &A,
        credentials: &Credentials,
    ) -> Result<BackendUser, LoginFailure> {
        let phone = credentials.validate().ok_or(LoginFailure::InvalidInput)?;

        let user = api
            .login(&phone, &credentials.password)
            .await
            .map_err(|e| {
                warn!(error = %e, "Login rejected");
                LoginFailure::from(e)
            })?;

        self.establish(user.clone())?;
        info!(user_id = %user.user_id, "Logged in");
        Ok(user)
    }

    /// Create an account and log into it.
    ///
    /// # Errors
    ///
    /// Returns [`SignupError::Invalid`] with every invalid field, including
    /// an already registered email, [`SignupError::Backend`] if the backend
    /// failed, or [`SignupError::Session`] if the account was created but the
    /// session could not be saved.
    #[instrument(skip(self, api, form))]
    pub async fn signup<A: AccountApi>(
        &self,
        api: &A,
        form: &SignupForm,
    ) -> Result<BackendUser, SignupError> {
        let new_user = form.validate()?;

        let user = api.create_user(&new_user).await.map_err(|e| match e {
            BackendError::Api { message, .. } if message.contains(EMAIL_EXISTS) => {
                SignupError::Invalid(ValidationErrors::single(
                    "email",
                    "This email is already registered",
                ))
            }
            other => {
                warn!(error = %other, "Signup failed");
                SignupError::Backend(other)
            }
        })?;

        self.establish(user.clone())?;
        info!(user_id = %user.user_id, "Account created");
        Ok(user)
    }

    /// Start a session for `user` now.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be stored. Nothing is left
    /// behind in that case.
    pub fn establish(&self, user: BackendUser) -> Result<SessionRecord, RepositoryError> {
        self.establish_at(user, Utc::now())
    }

    /// Start a session for `user` at `now`; see [`SessionManager::establish`].
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be stored.
    pub fn establish_at(
        &self,
        user: BackendUser,
        now: DateTime<Utc>,
    ) -> Result<SessionRecord, RepositoryError> {
        let record = SessionRecord::new(user, now);
        if let Err(e) = self.persist(&record) {
            warn!(error = %e, "Failed to persist session");
            self.clear_quietly();
            return Err(e);
        }
        Ok(record)
    }

    fn persist(&self, record: &SessionRecord) -> Result<(), RepositoryError> {
        self.repo.save(keys::LOGGED_IN_USER, record)?;
        self.repo
            .save_text(keys::USER_ID, &record.user.user_id.to_string())
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Whether a valid session exists now.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Whether a valid session exists at `now`.
    ///
    /// A missing record is invalid. An expired or unreadable record is
    /// invalid and is removed, as with [`SessionManager::state_at`].
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now).is_logged_in()
    }

    /// Current login state.
    ///
    /// An expired or unreadable record is removed.
    pub fn state(&self) -> SessionState {
        self.state_at(Utc::now())
    }

    /// Login state at `now`; see [`SessionManager::state`].
    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        match self.repo.load::<SessionRecord>(keys::LOGGED_IN_USER) {
            Ok(Some(record)) if record.is_valid_at(now) => SessionState::LoggedIn(Box::new(record)),
            Ok(Some(record)) => {
                info!(user_id = %record.user.user_id, "Session expired");
                self.clear_quietly();
                SessionState::LoggedOut
            }
            Ok(None) => SessionState::LoggedOut,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session");
                self.clear_quietly();
                SessionState::LoggedOut
            }
        }
    }

    /// End the session. Succeeds when already logged out.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be updated.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), RepositoryError> {
        let user = self.repo.remove(keys::LOGGED_IN_USER);
        let id = self.repo.remove(keys::USER_ID);
        user.and(id)?;
        info!("Logged out");
        Ok(())
    }

    fn clear_quietly(&self) {
        if let Err(e) = self.logout() {
            warn!(error = %e, "Failed to clear session");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeDelta;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, StorageError};
    use crate::backend::stub::{StubBackend, user};
    use crate::models::account::tests::valid_form;

    fn backend() -> StubBackend {
        StubBackend::with_products(Vec::new()).with_account("9876543210", "secret1", user(7, "Meera"))
    }

    #[tokio::test]
    async fn test_login_stores_record_and_user_id() {
        let repo = Repository::in_memory();
        let session = SessionManager::new(repo.clone());

        let user = session
            .login(&backend(), &Credentials::new(" 9876543210 ", "secret1"))
            .await
            .unwrap();

        assert_eq!(user.user_id.as_i64(), 7);
        assert!(session.is_valid());
        assert!(session.state().is_logged_in());
        assert_eq!(repo.load_text(keys::USER_ID).unwrap().as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_login_rejection_stores_nothing() {
        let repo = Repository::in_memory();
        let session = SessionManager::new(repo.clone());

        let err = session
            .login(&backend(), &Credentials::new("9876543210", "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(err, LoginFailure::InvalidCredentials(_)));
        assert!(!session.is_valid());
        assert!(repo.load_text(keys::LOGGED_IN_USER).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_input_checked_before_backend() {
        let session = SessionManager::new(Repository::in_memory());
        let err = session
            .login(&backend(), &Credentials::new("12345", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoginFailure::InvalidInput));
    }

    #[tokio::test]
    async fn test_login_server_error() {
        let backend = StubBackend {
            login_status: Some(500),
            ..StubBackend::default()
        };
        let session = SessionManager::new(Repository::in_memory());
        let err = session
            .login(&backend, &Credentials::new("9876543210", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoginFailure::Server(_)));
    }

    #[test]
    fn test_validity_is_bounded_by_ttl() {
        let session = SessionManager::new(Repository::in_memory());
        let login = Utc::now();
        session.establish_at(user(1, "Ravi"), login).unwrap();

        assert!(session.is_valid_at(login));
        assert!(session.is_valid_at(login + TimeDelta::hours(23)));
        assert!(!session.is_valid_at(login + TimeDelta::hours(24)));
    }

    #[test]
    fn test_expired_session_is_cleared_on_read() {
        let repo = Repository::in_memory();
        let session = SessionManager::new(repo.clone());
        let login = Utc::now() - TimeDelta::hours(25);
        session.establish_at(user(1, "Ravi"), login).unwrap();

        assert_eq!(session.state(), SessionState::LoggedOut);
        assert!(repo.load_text(keys::LOGGED_IN_USER).unwrap().is_none());
        assert!(repo.load_text(keys::USER_ID).unwrap().is_none());
    }

    #[test]
    fn test_expired_session_is_cleared_by_validity_check() {
        let repo = Repository::in_memory();
        let session = SessionManager::new(repo.clone());
        let login = Utc::now();
        session.establish_at(user(1, "Ravi"), login).unwrap();

        assert!(!session.is_valid_at(login + TimeDelta::hours(25)));
        assert!(repo.load_text(keys::LOGGED_IN_USER).unwrap().is_none());
        assert!(repo.load_text(keys::USER_ID).unwrap().is_none());
    }

    /// Store that refuses writes to one key.
    struct FailingStore {
        inner: MemoryStore,
        fail_key: &'static str,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.fail_key {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    fn failing_repo(fail_key: &'static str) -> Repository {
        Repository::new(Arc::new(FailingStore {
            inner: MemoryStore::new(),
            fail_key,
        }))
    }

    #[tokio::test]
    async fn test_login_fails_when_session_cannot_be_saved() {
        for fail_key in [keys::LOGGED_IN_USER, keys::USER_ID] {
            let repo = failing_repo(fail_key);
            let session = SessionManager::new(repo.clone());

            let err = session
                .login(&backend(), &Credentials::new("9876543210", "secret1"))
                .await
                .unwrap_err();

            assert!(matches!(err, LoginFailure::Storage(_)), "{fail_key}: {err:?}");
            assert!(repo.load_text(keys::LOGGED_IN_USER).unwrap().is_none());
            assert!(repo.load_text(keys::USER_ID).unwrap().is_none());
            assert_eq!(session.state(), SessionState::LoggedOut);
        }
    }

    #[tokio::test]
    async fn test_signup_reports_unsaved_session() {
        let backend = StubBackend::with_products(Vec::new());
        let repo = failing_repo(keys::USER_ID);
        let session = SessionManager::new(repo.clone());

        let err = session.signup(&backend, &valid_form()).await.unwrap_err();
        assert!(matches!(err, SignupError::Session(_)));
        assert!(repo.load_text(keys::LOGGED_IN_USER).unwrap().is_none());
        assert_eq!(backend.list_users().await.unwrap().len(), 1);
    }

    #[test]
    fn test_unreadable_session_fails_closed() {
        let repo = Repository::in_memory();
        repo.save_text(keys::LOGGED_IN_USER, "{\"user\":").unwrap();
        let session = SessionManager::new(repo.clone());

        assert!(!session.is_valid());
        assert_eq!(session.state(), SessionState::LoggedOut);
        assert!(repo.load_text(keys::LOGGED_IN_USER).unwrap().is_none());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let session = SessionManager::new(Repository::in_memory());
        session.establish(user(1, "Ravi")).unwrap();
        session.logout().unwrap();
        session.logout().unwrap();
        assert!(!session.is_valid());
    }

    #[tokio::test]
    async fn test_signup_logs_in() {
        let backend = StubBackend::with_products(Vec::new());
        let session = SessionManager::new(Repository::in_memory());

        let user = session.signup(&backend, &valid_form()).await.unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Asha"));
        assert_eq!(session.state().user(), Some(&user));
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_is_field_error() {
        let backend = StubBackend::with_products(Vec::new());
        let session = SessionManager::new(Repository::in_memory());
        session.signup(&backend, &valid_form()).await.unwrap();
        session.logout().unwrap();

        let err = session.signup(&backend, &valid_form()).await.unwrap_err();
        let SignupError::Invalid(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.get("email"), Some("This email is already registered"));
        assert!(!session.is_valid());
    }

    #[tokio::test]
    async fn test_signup_invalid_form_skips_backend() {
        let backend = StubBackend::with_products(Vec::new());
        let session = SessionManager::new(Repository::in_memory());
        let form = SignupForm {
            accept_terms: false,
            ..valid_form()
        };

        let err = session.signup(&backend, &form).await.unwrap_err();
        assert!(matches!(err, SignupError::Invalid(_)));
        assert!(backend.list_users().await.unwrap().is_empty());
    }
}
