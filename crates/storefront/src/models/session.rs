//! Session record types.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::BackendUser;

/// How long a login stays valid.
pub const SESSION_TTL: TimeDelta = TimeDelta::hours(24);

/// The `loggedInUser` entry of the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// User object exactly as the backend returned it.
    pub user: BackendUser,
    /// Login instant, stored as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub login_time: DateTime<Utc>,
}

impl SessionRecord {
    /// Start a record for `user` at `now`.
    #[must_use]
    pub const fn new(user: BackendUser, now: DateTime<Utc>) -> Self {
        Self {
            user,
            login_time: now,
        }
    }

    /// Whether the record is still inside [`SESSION_TTL`] at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.login_time) < SESSION_TTL
    }

    /// When the session stops being valid.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.login_time + SESSION_TTL
    }
}

/// Login state derived from the session store.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn(Box<SessionRecord>),
}

impl SessionState {
    /// The logged-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&BackendUser> {
        match self {
            Self::LoggedOut => None,
            Self::LoggedIn(record) => Some(&record.user),
        }
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn(_))
    }
}
