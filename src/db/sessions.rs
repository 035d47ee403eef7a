//! Session tokens issued for API access.

use super::{Database, now_ms};
use anyhow::Result;
use rusqlite::{OptionalExtension, params};
use tracing::{debug, info};
use uuid::Uuid;

/// An issued session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: i64,
    pub created_at: i64,
}

impl Database {
    /// Issue a new token for `user_id`, valid for `ttl_ms`.
    pub fn create_session(&self, user_id: &str, ttl_ms: i64) -> Result<Session> {
        let now = now_ms();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            expires_at: now.saturating_add(ttl_ms),
            created_at: now,
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (token, user_id, expires_at, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    session.token,
                    session.user_id,
                    session.expires_at,
                    session.created_at
                ],
            )?;
            Ok(())
        })?;

        info!(user = %user_id, expires_at = session.expires_at, "Issued session");
        Ok(session)
    }

    /// Resolve a token to its user. Unknown or expired tokens give `None`.
    pub fn resolve_session(&self, token: &str) -> Result<Option<String>> {
        let now = now_ms();
        self.with_conn(|conn| {
            let user = conn
                .query_row(
                    "SELECT user_id FROM sessions WHERE token = ?1 AND expires_at > ?2",
                    params![token, now],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            if user.is_none() {
                debug!("Session token unknown or expired");
            }
            Ok(user)
        })
    }

    /// Revoke a token. Returns false if it did not exist.
    pub fn revoke_session(&self, token: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
            Ok(removed > 0)
        })
    }

    /// Drop every expired session. Returns the number removed.
    pub fn purge_expired_sessions(&self) -> Result<usize> {
        let now = now_ms();
        self.with_conn(|conn| {
            let removed =
                conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])?;
            if removed > 0 {
                debug!(removed, "Purged expired sessions");
            }
            Ok(removed)
        })
    }
}
