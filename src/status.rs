//! Quadrant categories and status transitions.
//!
//! The quadrant is derived from the `important` and `urgent` flags and is
//! never stored. Status changes go through [`toggle_status`] (kept for the
//! single-button UI) or through explicit [`Transition`]s, which separate
//! approval of assistant-generated tasks from completion.

use crate::types::TaskStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Importance/urgency quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    #[serde(rename = "important_urgent")]
    UrgentImportant,
    #[serde(rename = "important_not_urgent")]
    ImportantOnly,
    #[serde(rename = "not_important_urgent")]
    UrgentOnly,
    #[serde(rename = "not_important_not_urgent")]
    Neither,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::UrgentImportant,
        Quadrant::ImportantOnly,
        Quadrant::UrgentOnly,
        Quadrant::Neither,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::UrgentImportant => "important_urgent",
            Quadrant::ImportantOnly => "important_not_urgent",
            Quadrant::UrgentOnly => "not_important_urgent",
            Quadrant::Neither => "not_important_not_urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Quadrant::ALL.into_iter().find(|q| q.as_str() == s)
    }

    /// Short human label for listings.
    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::UrgentImportant => "urgent & important",
            Quadrant::ImportantOnly => "important",
            Quadrant::UrgentOnly => "urgent",
            Quadrant::Neither => "neither",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the quadrant from the two stored flags.
pub fn category(important: bool, urgent: bool) -> Quadrant {
    match (important, urgent) {
        (true, true) => Quadrant::UrgentImportant,
        (true, false) => Quadrant::ImportantOnly,
        (false, true) => Quadrant::UrgentOnly,
        (false, false) => Quadrant::Neither,
    }
}

/// Single-button status toggle.
///
/// Approval is folded in here: a `pending_approval` task becomes `pending`.
pub fn toggle_status(status: TaskStatus) -> TaskStatus {
    match status {
        TaskStatus::Pending => TaskStatus::Completed,
        TaskStatus::Completed => TaskStatus::Pending,
        TaskStatus::PendingApproval => TaskStatus::Pending,
    }
}

/// Explicit status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// `pending_approval -> pending`
    Approve,
    /// `pending -> completed`
    Complete,
    /// `completed -> pending`
    Reopen,
}

impl Transition {
    pub fn verb(&self) -> &'static str {
        match self {
            Transition::Approve => "approve",
            Transition::Complete => "complete",
            Transition::Reopen => "reopen",
        }
    }

    /// Target status if the transition is legal from `from`.
    pub fn apply(&self, from: TaskStatus) -> Option<TaskStatus> {
        match (self, from) {
            (Transition::Approve, TaskStatus::PendingApproval) => Some(TaskStatus::Pending),
            (Transition::Complete, TaskStatus::Pending) => Some(TaskStatus::Completed),
            (Transition::Reopen, TaskStatus::Completed) => Some(TaskStatus::Pending),
            _ => None,
        }
    }
}
