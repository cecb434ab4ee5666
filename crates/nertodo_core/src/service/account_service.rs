//! Account use-case service.
//!
//! # Responsibility
//! - Sign users up and authenticate them against stored digests.
//! - Issue, resolve and revoke session tokens.
//!
//! # Invariants
//! - Plaintext passwords and session tokens never reach storage or logs.
//! - Emails are stored lowercased; usernames are stored as given (trimmed).
//! - A duplicate username or email is a `None` result, not an error.

use crate::auth::password::{hash_password, verify_password, PasswordHashError};
use crate::model::user::{Session, SessionToken, User, UserCredentials, UserId};
use crate::repo::user_repo::UserRepository;
use crate::repo::{RepoError, RepoResult};
use crate::resolve::clock::Clock;
use chrono::Duration;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Shortest accepted password, counted in chars.
pub const MIN_PASSWORD_CHARS: usize = 8;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{1,64}$").expect("valid username regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

pub type AccountResult<T> = Result<T, AccountError>;

/// Service error for account use-cases.
#[derive(Debug)]
pub enum AccountError {
    InvalidUsername(String),
    InvalidEmail(String),
    WeakPassword,
    /// Session missing, expired or revoked.
    Unauthorized,
    Hashing(PasswordHashError),
    Repo(RepoError),
}

impl Display for AccountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername(value) => write!(
                f,
                "invalid username `{value}`; use 1-64 letters, digits, `_`, `.` or `-`"
            ),
            Self::InvalidEmail(value) => write!(f, "invalid email `{value}`"),
            Self::WeakPassword => write!(
                f,
                "password must be at least {MIN_PASSWORD_CHARS} characters"
            ),
            Self::Unauthorized => write!(f, "not signed in or session expired"),
            Self::Hashing(err) => write!(f, "password hashing failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Hashing(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AccountError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Account service facade over a user repository.
pub struct AccountService<R: UserRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
}

impl<R: UserRepository> AccountService<R> {
    pub fn new(repo: R, clock: Arc<dyn Clock>, session_ttl: Duration) -> Self {
        Self {
            repo,
            clock,
            session_ttl,
        }
    }

    /// Creates an account.
    ///
    /// # Contract
    /// - Returns `Ok(None)` when the username or email is already taken.
    /// - Returns validation errors before touching storage.
    pub fn sign_up(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> AccountResult<Option<User>> {
        let username = username.trim();
        let email = email.trim().to_lowercase();
        if !USERNAME_RE.is_match(username) {
            return Err(AccountError::InvalidUsername(username.to_string()));
        }
        if !EMAIL_RE.is_match(&email) {
            return Err(AccountError::InvalidEmail(email));
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AccountError::WeakPassword);
        }

        let credentials = UserCredentials {
            user: User {
                id: Uuid::new_v4(),
                username: username.to_string(),
                email,
            },
            password_hash: hash_password(password).map_err(AccountError::Hashing)?,
        };

        match self.repo.insert_user(&credentials) {
            Ok(()) => {
                info!(
                    "event=sign_up module=account status=ok user_id={}",
                    credentials.user.id
                );
                Ok(Some(credentials.user))
            }
            Err(RepoError::Conflict(column)) => {
                info!("event=sign_up module=account status=conflict column={column}");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Checks a username/password pair; `None` on any mismatch.
    pub fn authenticate(&self, username: &str, password: &str) -> AccountResult<Option<User>> {
        let Some(credentials) = self.repo.find_credentials(username.trim())? else {
            warn!("event=sign_in module=account status=rejected reason=unknown_user");
            return Ok(None);
        };
        if !verify_password(password, &credentials.password_hash) {
            warn!(
                "event=sign_in module=account status=rejected reason=bad_password user_id={}",
                credentials.user.id
            );
            return Ok(None);
        }
        info!(
            "event=sign_in module=account status=ok user_id={}",
            credentials.user.id
        );
        Ok(Some(credentials.user))
    }

    /// Issues a new session for `user_id`.
    ///
    /// Expired sessions are purged as a side effect.
    pub fn create_session(&self, user_id: UserId) -> AccountResult<SessionToken> {
        let now_ms = self.clock.now_epoch_ms();
        let purged = self.repo.purge_expired_sessions(now_ms)?;
        let session = Session {
            token: SessionToken::generate(),
            user_id,
            expires_at_ms: now_ms.saturating_add(self.session_ttl.num_milliseconds()),
        };
        self.repo.insert_session(&session)?;
        info!(
            "event=session_create module=account status=ok user_id={user_id} purged={purged}"
        );
        Ok(session.token)
    }

    /// Resolves a session token to its user, if still valid.
    pub fn user_id_from_session(&self, token: &SessionToken) -> AccountResult<Option<UserId>> {
        if token.as_str().is_empty() {
            return Ok(None);
        }
        Ok(self
            .repo
            .find_session_user(token, self.clock.now_epoch_ms())?)
    }

    /// Like [`Self::user_id_from_session`] but fails with `Unauthorized`.
    pub fn require_user_id(&self, token: &SessionToken) -> AccountResult<UserId> {
        self.user_id_from_session(token)?
            .ok_or(AccountError::Unauthorized)
    }

    /// Returns the signed-in user for `token`.
    pub fn current_user(&self, token: &SessionToken) -> AccountResult<User> {
        let user_id = self.require_user_id(token)?;
        self.repo
            .get_user(user_id)?
            .ok_or(AccountError::Unauthorized)
    }

    /// Revokes a session. Revoking an unknown token is not an error.
    pub fn sign_out(&self, token: &SessionToken) -> RepoResult<bool> {
        let removed = self.repo.delete_session(token)?;
        info!("event=sign_out module=account status=ok removed={removed}");
        Ok(removed)
    }
}
