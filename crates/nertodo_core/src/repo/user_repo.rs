//! User and session repository.
//!
//! # Responsibility
//! - Persist accounts and their password digests.
//! - Persist, look up and revoke session tokens.
//!
//! # Invariants
//! - Username and email are unique; duplicates return `RepoError::Conflict`.
//! - Expired sessions never resolve to a user.

use crate::model::user::{Session, SessionToken, User, UserCredentials, UserId};
use crate::repo::{parse_uuid, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT uuid, username, email, password_hash FROM users";

/// Persistence contract for accounts and sessions.
pub trait UserRepository {
    fn insert_user(&self, credentials: &UserCredentials) -> RepoResult<()>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_credentials(&self, username: &str) -> RepoResult<Option<UserCredentials>>;
    fn insert_session(&self, session: &Session) -> RepoResult<()>;
    /// Returns the owner of `token` if the session has not expired at `now_ms`.
    fn find_session_user(&self, token: &SessionToken, now_ms: i64) -> RepoResult<Option<UserId>>;
    /// Returns whether a session row was removed.
    fn delete_session(&self, token: &SessionToken) -> RepoResult<bool>;
    /// Removes sessions expired at `now_ms`; returns how many were removed.
    fn purge_expired_sessions(&self, now_ms: i64) -> RepoResult<usize>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&self, credentials: &UserCredentials) -> RepoResult<()> {
        let user = &credentials.user;
        self.conn.execute(
            "INSERT INTO users (uuid, username, email, password_hash)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                user.id.to_string(),
                user.username.as_str(),
                user.email.as_str(),
                credentials.password_hash.as_str(),
            ],
        )?;
        Ok(())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_credentials_row(row)?.user)),
            None => Ok(None),
        }
    }

    fn find_credentials(&self, username: &str) -> RepoResult<Option<UserCredentials>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE username = ?1;"))?;
        let mut rows = stmt.query([username])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_credentials_row(row)?)),
            None => Ok(None),
        }
    }

    fn insert_session(&self, session: &Session) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO sessions (token_hash, user_uuid, expires_at) VALUES (?1, ?2, ?3);",
            params![
                session.token.digest(),
                session.user_id.to_string(),
                session.expires_at_ms,
            ],
        )?;
        Ok(())
    }

    fn find_session_user(&self, token: &SessionToken, now_ms: i64) -> RepoResult<Option<UserId>> {
        let user_uuid: Option<String> = self
            .conn
            .query_row(
                "SELECT user_uuid FROM sessions WHERE token_hash = ?1 AND expires_at > ?2;",
                params![token.digest(), now_ms],
                |row| row.get(0),
            )
            .optional()?;

        user_uuid
            .map(|value| parse_uuid(&value, "sessions.user_uuid"))
            .transpose()
    }

    fn delete_session(&self, token: &SessionToken) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM sessions WHERE token_hash = ?1;",
                [token.digest()],
            )?;
        Ok(changed > 0)
    }

    fn purge_expired_sessions(&self, now_ms: i64) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE expires_at <= ?1;", [now_ms])?;
        Ok(removed)
    }
}

fn parse_credentials_row(row: &Row<'_>) -> RepoResult<UserCredentials> {
    let uuid_text: String = row.get("uuid")?;
    Ok(UserCredentials {
        user: User {
            id: parse_uuid(&uuid_text, "users.uuid")?,
            username: row.get("username")?,
            email: row.get("email")?,
        },
        password_hash: row.get("password_hash")?,
    })
}
