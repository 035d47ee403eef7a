//! Core types for the task service.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    PendingApproval,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::PendingApproval => "pending_approval",
            TaskStatus::Completed => "completed",
        }
    }

    /// Parse a stored status string. Returns None for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "pending_approval" => Some(TaskStatus::PendingApproval),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task owned by a single user.
///
/// Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<i64>,
    pub important: bool,
    pub urgent: bool,
    pub status: TaskStatus,
    pub period: Option<String>,
    pub parent_id: Option<i64>,

    // Archival
    pub is_archived: bool,
    pub archived_by: Option<String>,
    pub archived_at: Option<i64>,
    pub archive_reason: Option<String>,

    // Reminders
    pub remind_at: Option<i64>,
    pub remind_type: Option<String>,
    pub is_reminded: bool,

    // Self-assessment scores
    pub difficulty: Option<i32>,
    pub motivation: Option<i32>,
    pub completion_rate: Option<f64>,
    pub feedback: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}

/// A task with its children for tree output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTree {
    #[serde(flatten)]
    pub task: Task,
    pub children: Vec<TaskTree>,
}

impl TaskTree {
    /// Number of tasks in this subtree, including the root.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TaskTree::size).sum::<usize>()
    }
}

/// A timestamp as sent by clients: epoch milliseconds (the form tasks are
/// returned in) or a date string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeInput {
    Millis(i64),
    /// `YYYY-MM-DDTHH:MM:SS` in local time, or RFC 3339.
    Text(String),
}

impl From<&str> for TimeInput {
    fn from(s: &str) -> Self {
        TimeInput::Text(s.to_string())
    }
}

impl From<i64> for TimeInput {
    fn from(ms: i64) -> Self {
        TimeInput::Millis(ms)
    }
}

/// Fields accepted when creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<TimeInput>,
    #[serde(default)]
    pub important: bool,
    #[serde(default)]
    pub urgent: bool,
    pub status: Option<TaskStatus>,
    pub period: Option<String>,
    pub parent_id: Option<i64>,
    pub remind_at: Option<TimeInput>,
    pub remind_type: Option<String>,
}

/// Partial update of a task.
///
/// Nullable fields use `Option<Option<T>>`: `None` leaves the column
/// untouched, `Some(None)` clears it, `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<TimeInput>>,
    pub important: Option<bool>,
    pub urgent: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub period: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub parent_id: Option<Option<i64>>,
    pub is_archived: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub archive_reason: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub remind_at: Option<Option<TimeInput>>,
    #[serde(default, deserialize_with = "nullable")]
    pub remind_type: Option<Option<String>>,
    pub is_reminded: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub difficulty: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub motivation: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub completion_rate: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub feedback: Option<Option<String>>,
}

/// Distinguish an explicit `null` from an absent key.
/// Paired with `#[serde(default)]`, absent stays `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A nested task proposal, as produced by the assistant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "dueDate")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub important: bool,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub children: Vec<TaskDraft>,
}

impl TaskDraft {
    /// Total number of tasks in the draft, including nested children.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TaskDraft::count).sum::<usize>()
    }
}

/// Personality profile used to shape the assistant prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Personality {
    pub user_id: String,
    pub mbti: String,
    pub learning_style: String,
    pub energy_level: i32,
    pub work_rhythm: String,
    pub preferred_time: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields accepted when saving a personality profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityInput {
    pub mbti: String,
    pub learning_style: String,
    pub energy_level: i32,
    pub work_rhythm: String,
    #[serde(default)]
    pub preferred_time: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_distinguishes_absent_and_null() {
        let absent: TaskPatch = serde_json::from_value(json!({"title": "x"})).unwrap();
        assert_eq!(absent.parent_id, None);
        assert_eq!(absent.due_date, None);

        let cleared: TaskPatch =
            serde_json::from_value(json!({"parentId": null, "dueDate": null})).unwrap();
        assert_eq!(cleared.parent_id, Some(None));
        assert_eq!(cleared.due_date, Some(None));

        let set: TaskPatch = serde_json::from_value(json!({"parentId": 5})).unwrap();
        assert_eq!(set.parent_id, Some(Some(5)));
    }

    #[test]
    fn test_time_input_accepts_millis_and_text() {
        let patch: TaskPatch = serde_json::from_value(json!({
            "dueDate": 1_714_557_600_000_i64,
            "remindAt": "2024-05-01T09:00:00"
        }))
        .unwrap();
        assert_eq!(patch.due_date, Some(Some(TimeInput::Millis(1_714_557_600_000))));
        assert_eq!(
            patch.remind_at,
            Some(Some(TimeInput::Text("2024-05-01T09:00:00".to_string())))
        );

        let new: NewTask =
            serde_json::from_value(json!({"title": "x", "dueDate": 1_714_557_600_000_i64}))
                .unwrap();
        assert_eq!(new.due_date, Some(TimeInput::Millis(1_714_557_600_000)));
    }

    #[test]
    fn test_patch_scores_are_nullable() {
        let cleared: TaskPatch =
            serde_json::from_value(json!({"difficulty": null, "completionRate": null})).unwrap();
        assert_eq!(cleared.difficulty, Some(None));
        assert_eq!(cleared.completion_rate, Some(None));
        assert_eq!(cleared.motivation, None);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(TaskStatus::PendingApproval).unwrap(),
            json!("pending_approval")
        );
        assert_eq!(TaskStatus::parse("completed"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::parse("done"), None);
    }

    #[test]
    fn test_draft_accepts_due_date_alias() {
        let draft: TaskDraft = serde_json::from_value(json!({
            "title": "Plan",
            "dueDate": "2024-05-01T23:59:00",
            "children": [{"title": "Step1"}, {"title": "Step2"}]
        }))
        .unwrap();
        assert_eq!(draft.deadline.as_deref(), Some("2024-05-01T23:59:00"));
        assert_eq!(draft.count(), 3);
    }
}
