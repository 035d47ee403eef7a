//! Personality profile storage, one row per user.

use super::{Database, now_ms};
use crate::error::ApiError;
use crate::types::{Personality, PersonalityInput};
use anyhow::Result;
use rusqlite::{OptionalExtension, Row, params};

pub const MIN_MBTI_LEN: usize = 4;
pub const ENERGY_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

fn parse_personality_row(row: &Row) -> rusqlite::Result<Personality> {
    let preferred_json: String = row.get("preferred_time")?;
    let preferred_time = serde_json::from_str(&preferred_json).unwrap_or_default();
    Ok(Personality {
        user_id: row.get("user_id")?,
        mbti: row.get("mbti")?,
        learning_style: row.get("learning_style")?,
        energy_level: row.get("energy_level")?,
        work_rhythm: row.get("work_rhythm")?,
        preferred_time,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn validate(input: &PersonalityInput) -> Result<()> {
    if input.mbti.trim().chars().count() < MIN_MBTI_LEN {
        return Err(ApiError::invalid_value(
            "mbti",
            &format!("mbti must be at least {} characters", MIN_MBTI_LEN),
        )
        .into());
    }
    if input.learning_style.trim().is_empty() {
        return Err(ApiError::missing_field("learningStyle").into());
    }
    if input.work_rhythm.trim().is_empty() {
        return Err(ApiError::missing_field("workRhythm").into());
    }
    if !ENERGY_RANGE.contains(&input.energy_level) {
        return Err(ApiError::invalid_value(
            "energyLevel",
            &format!(
                "energyLevel must be between {} and {}",
                ENERGY_RANGE.start(),
                ENERGY_RANGE.end()
            ),
        )
        .into());
    }
    Ok(())
}

/// Drop blanks and repeats, keeping first-seen order.
fn normalize_slots(slots: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(slots.len());
    for slot in slots {
        let slot = slot.trim();
        if !slot.is_empty() && !out.iter().any(|s| s == slot) {
            out.push(slot.to_string());
        }
    }
    out
}

impl Database {
    pub fn get_personality(&self, user_id: &str) -> Result<Option<Personality>> {
        self.with_conn(|conn| {
            let personality = conn
                .query_row(
                    "SELECT * FROM personalities WHERE user_id = ?1",
                    params![user_id],
                    parse_personality_row,
                )
                .optional()?;
            Ok(personality)
        })
    }

    /// Create or replace the profile for a user.
    pub fn upsert_personality(&self, user_id: &str, input: PersonalityInput) -> Result<Personality> {
        validate(&input)?;
        let preferred_time = normalize_slots(&input.preferred_time);
        let preferred_json = serde_json::to_string(&preferred_time)?;
        let now = now_ms();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO personalities (
                    user_id, mbti, learning_style, energy_level, work_rhythm,
                    preferred_time, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                ON CONFLICT(user_id) DO UPDATE SET
                    mbti = excluded.mbti,
                    learning_style = excluded.learning_style,
                    energy_level = excluded.energy_level,
                    work_rhythm = excluded.work_rhythm,
                    preferred_time = excluded.preferred_time,
                    updated_at = excluded.updated_at",
                params![
                    user_id,
                    input.mbti.trim(),
                    input.learning_style.trim(),
                    input.energy_level,
                    input.work_rhythm.trim(),
                    preferred_json,
                    now,
                ],
            )?;

            let personality = conn.query_row(
                "SELECT * FROM personalities WHERE user_id = ?1",
                params![user_id],
                parse_personality_row,
            )?;
            Ok(personality)
        })
    }
}
