//! Per-user daily check-in tracking.

use super::Database;
use crate::dates::start_of_day;
use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::{OptionalExtension, params};

impl Database {
    pub fn last_inquiry(&self, user_id: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let last = conn
                .query_row(
                    "SELECT last_inquiry_at FROM inquiries WHERE user_id = ?1",
                    params![user_id],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?;
            Ok(last)
        })
    }

    /// True when nothing has been recorded for the local day of `now`.
    pub fn inquiry_due(&self, user_id: &str, now: DateTime<Local>) -> Result<bool> {
        Ok(match self.last_inquiry(user_id)? {
            Some(last) => last < start_of_day(now),
            None => true,
        })
    }

    pub fn record_inquiry(&self, user_id: &str, now: DateTime<Local>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO inquiries (user_id, last_inquiry_at) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET last_inquiry_at = excluded.last_inquiry_at",
                params![user_id, now.timestamp_millis()],
            )?;
            Ok(())
        })
    }
}
