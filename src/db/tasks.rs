//! Task CRUD, hierarchy lookups and status transitions.
//!
//! Every query is scoped by `user_id`. A task owned by someone else is
//! reported exactly like a missing one.

use super::{Database, now_ms};
use crate::dates::{end_of_day, parse_timestamp, resolve_time};
use crate::error::ApiError;
use crate::status::{Transition, toggle_status};
use crate::types::{NewTask, Task, TaskDraft, TaskPatch, TaskStatus, TimeInput};
use anyhow::Result;
use chrono::Local;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};
use std::collections::HashSet;
use tracing::debug;

impl ToSql for TaskStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        TaskStatus::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown task status '{}'", s).into()))
    }
}

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: row.get("due_date")?,
        important: row.get("important")?,
        urgent: row.get("urgent")?,
        status: row.get("status")?,
        period: row.get("period")?,
        parent_id: row.get("parent_id")?,
        is_archived: row.get("is_archived")?,
        archived_by: row.get("archived_by")?,
        archived_at: row.get("archived_at")?,
        archive_reason: row.get("archive_reason")?,
        remind_at: row.get("remind_at")?,
        remind_type: row.get("remind_type")?,
        is_reminded: row.get("is_reminded")?,
        difficulty: row.get("difficulty")?,
        motivation: row.get("motivation")?,
        completion_rate: row.get("completion_rate")?,
        feedback: row.get("feedback")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Internal helper to get a task using an existing connection (avoids deadlock).
fn get_task_internal(conn: &Connection, user_id: &str, task_id: i64) -> Result<Option<Task>> {
    let task = conn
        .query_row(
            "SELECT * FROM tasks WHERE id = ?1 AND user_id = ?2",
            params![task_id, user_id],
            parse_task_row,
        )
        .optional()?;
    Ok(task)
}

fn parent_of(conn: &Connection, user_id: &str, task_id: i64) -> Result<Option<Option<i64>>> {
    let parent = conn
        .query_row(
            "SELECT parent_id FROM tasks WHERE id = ?1 AND user_id = ?2",
            params![task_id, user_id],
            |row| row.get::<_, Option<i64>>(0),
        )
        .optional()?;
    Ok(parent)
}

/// Check that `parent_id` names a task of the same user and, when
/// re-parenting an existing task, that the new link does not close a cycle.
fn ensure_parent(
    conn: &Connection,
    user_id: &str,
    task_id: Option<i64>,
    parent_id: i64,
) -> Result<()> {
    if task_id == Some(parent_id) {
        return Err(ApiError::parent_cycle(parent_id, parent_id).into());
    }

    let mut cursor = match parent_of(conn, user_id, parent_id)? {
        Some(grandparent) => grandparent,
        None => {
            return Err(ApiError::invalid_value(
                "parentId",
                &format!("parent task {} does not exist", parent_id),
            )
            .into());
        }
    };

    let Some(task_id) = task_id else {
        return Ok(());
    };

    // Walk up from the new parent; reaching the task itself means a cycle.
    let mut seen = HashSet::from([parent_id]);
    while let Some(ancestor) = cursor {
        if ancestor == task_id {
            return Err(ApiError::parent_cycle(task_id, parent_id).into());
        }
        if !seen.insert(ancestor) {
            break;
        }
        cursor = parent_of(conn, user_id, ancestor)?.flatten();
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(ApiError::missing_field("title").into());
    }
    Ok(())
}

fn resolve_optional_time(field: &str, value: Option<&TimeInput>) -> Result<Option<i64>> {
    match value {
        Some(v) => Ok(Some(resolve_time(field, v)?)),
        None => Ok(None),
    }
}

/// Three-state timestamp patch: absent, cleared or set.
fn resolve_patch_time(
    field: &str,
    value: Option<&Option<TimeInput>>,
) -> Result<Option<Option<i64>>> {
    match value {
        Some(Some(v)) => Ok(Some(Some(resolve_time(field, v)?))),
        Some(None) => Ok(Some(None)),
        None => Ok(None),
    }
}

/// Difficulty and motivation are self-ratings on a 1-10 scale.
const SCORE_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

fn validate_scores(patch: &TaskPatch) -> Result<()> {
    for (field, value) in [("difficulty", patch.difficulty), ("motivation", patch.motivation)] {
        if let Some(Some(v)) = value {
            if !SCORE_RANGE.contains(&v) {
                return Err(ApiError::invalid_value(
                    field,
                    &format!("{} must be between 1 and 10, got {}", field, v),
                )
                .into());
            }
        }
    }
    if let Some(Some(rate)) = patch.completion_rate {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ApiError::invalid_value(
                "completionRate",
                &format!("completionRate must be between 0 and 1, got {}", rate),
            )
            .into());
        }
    }
    Ok(())
}

/// Fully resolved values for a new row.
struct InsertTask<'a> {
    title: &'a str,
    description: Option<&'a str>,
    due_date: i64,
    important: bool,
    urgent: bool,
    status: TaskStatus,
    period: Option<&'a str>,
    parent_id: Option<i64>,
    remind_at: Option<i64>,
    remind_type: Option<&'a str>,
}

fn insert_task(conn: &Connection, user_id: &str, row: InsertTask<'_>) -> Result<Task> {
    let now = now_ms();
    conn.execute(
        "INSERT INTO tasks (
            user_id, title, description, due_date, important, urgent, status,
            period, parent_id, remind_at, remind_type, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            user_id,
            row.title,
            row.description,
            row.due_date,
            row.important,
            row.urgent,
            row.status,
            row.period,
            row.parent_id,
            row.remind_at,
            row.remind_type,
            now,
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();

    Ok(Task {
        id,
        user_id: user_id.to_string(),
        title: row.title.to_string(),
        description: row.description.map(str::to_string),
        due_date: Some(row.due_date),
        important: row.important,
        urgent: row.urgent,
        status: row.status,
        period: row.period.map(str::to_string),
        parent_id: row.parent_id,
        is_archived: false,
        archived_by: None,
        archived_at: None,
        archive_reason: None,
        remind_at: row.remind_at,
        remind_type: row.remind_type.map(str::to_string),
        is_reminded: false,
        difficulty: None,
        motivation: None,
        completion_rate: None,
        feedback: None,
        created_at: now,
        updated_at: now,
    })
}

/// Write every mutable column of `task` back to its row.
fn write_task(conn: &Connection, task: &Task) -> Result<()> {
    conn.execute(
        "UPDATE tasks SET
            title = ?1, description = ?2, due_date = ?3, important = ?4, urgent = ?5,
            status = ?6, period = ?7, parent_id = ?8, is_archived = ?9, archived_by = ?10,
            archived_at = ?11, archive_reason = ?12, remind_at = ?13, remind_type = ?14,
            is_reminded = ?15, difficulty = ?16, motivation = ?17, completion_rate = ?18,
            feedback = ?19, updated_at = ?20
        WHERE id = ?21 AND user_id = ?22",
        params![
            task.title,
            task.description,
            task.due_date,
            task.important,
            task.urgent,
            task.status,
            task.period,
            task.parent_id,
            task.is_archived,
            task.archived_by,
            task.archived_at,
            task.archive_reason,
            task.remind_at,
            task.remind_type,
            task.is_reminded,
            task.difficulty,
            task.motivation,
            task.completion_rate,
            task.feedback,
            task.updated_at,
            task.id,
            task.user_id,
        ],
    )?;
    Ok(())
}

fn validate_draft(draft: &TaskDraft) -> Result<()> {
    validate_title(&draft.title)?;
    if let Some(deadline) = draft.deadline.as_deref() {
        parse_timestamp("deadline", deadline)?;
    }
    draft.children.iter().try_for_each(validate_draft)
}

impl Database {
    /// All tasks of a user, newest first.
    pub fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM tasks WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let tasks = stmt
                .query_map(params![user_id], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Get a task by ID.
    pub fn get_task(&self, user_id: &str, task_id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, user_id, task_id))
    }

    /// Direct children of a task, oldest first.
    pub fn get_children(&self, user_id: &str, parent_id: i64) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM tasks WHERE parent_id = ?1 AND user_id = ?2
                 ORDER BY created_at ASC, id ASC",
            )?;
            let tasks = stmt
                .query_map(params![parent_id, user_id], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Parent of a task; `None` when the task is missing or top level.
    pub fn get_parent(&self, user_id: &str, task_id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let Some(task) = get_task_internal(conn, user_id, task_id)? else {
                return Ok(None);
            };
            match task.parent_id {
                Some(pid) => get_task_internal(conn, user_id, pid),
                None => Ok(None),
            }
        })
    }

    /// Create a new task.
    ///
    /// Status defaults to `pending_approval`; the due date defaults to
    /// 23:59:00 local time today.
    pub fn create_task(&self, user_id: &str, input: NewTask) -> Result<Task> {
        validate_title(&input.title)?;
        let due_date = match input.due_date.as_ref() {
            Some(v) => resolve_time("dueDate", v)?,
            None => end_of_day(Local::now()),
        };
        let remind_at = resolve_optional_time("remindAt", input.remind_at.as_ref())?;

        self.with_conn(|conn| {
            if let Some(pid) = input.parent_id {
                ensure_parent(conn, user_id, None, pid)?;
            }
            let task = insert_task(
                conn,
                user_id,
                InsertTask {
                    title: &input.title,
                    description: input.description.as_deref(),
                    due_date,
                    important: input.important,
                    urgent: input.urgent,
                    status: input.status.unwrap_or(TaskStatus::PendingApproval),
                    period: input.period.as_deref(),
                    parent_id: input.parent_id,
                    remind_at,
                    remind_type: input.remind_type.as_deref(),
                },
            )?;
            debug!(task_id = task.id, user = %user_id, "Created task");
            Ok(task)
        })
    }

    /// Apply a partial update. Returns `None` if the task does not exist
    /// for this user.
    pub fn update_task(&self, user_id: &str, task_id: i64, patch: TaskPatch) -> Result<Option<Task>> {
        if let Some(ref title) = patch.title {
            validate_title(title)?;
        }
        validate_scores(&patch)?;
        let due_date = resolve_patch_time("dueDate", patch.due_date.as_ref())?;
        let remind_at = resolve_patch_time("remindAt", patch.remind_at.as_ref())?;

        self.with_conn(|conn| {
            let Some(task) = get_task_internal(conn, user_id, task_id)? else {
                return Ok(None);
            };

            if let Some(Some(pid)) = patch.parent_id {
                if task.parent_id != Some(pid) {
                    ensure_parent(conn, user_id, Some(task_id), pid)?;
                }
            }

            let now = now_ms();
            let (archived_by, archived_at) = match patch.is_archived {
                Some(true) if !task.is_archived => (Some(user_id.to_string()), Some(now)),
                Some(false) => (None, None),
                _ => (task.archived_by.clone(), task.archived_at),
            };

            let updated = Task {
                title: patch.title.unwrap_or(task.title.clone()),
                description: patch.description.unwrap_or(task.description.clone()),
                due_date: due_date.unwrap_or(task.due_date),
                important: patch.important.unwrap_or(task.important),
                urgent: patch.urgent.unwrap_or(task.urgent),
                status: patch.status.unwrap_or(task.status),
                period: patch.period.unwrap_or(task.period.clone()),
                parent_id: patch.parent_id.unwrap_or(task.parent_id),
                is_archived: patch.is_archived.unwrap_or(task.is_archived),
                archived_by,
                archived_at,
                archive_reason: patch.archive_reason.unwrap_or(task.archive_reason.clone()),
                remind_at: remind_at.unwrap_or(task.remind_at),
                remind_type: patch.remind_type.unwrap_or(task.remind_type.clone()),
                is_reminded: patch.is_reminded.unwrap_or(task.is_reminded),
                difficulty: patch.difficulty.unwrap_or(task.difficulty),
                motivation: patch.motivation.unwrap_or(task.motivation),
                completion_rate: patch.completion_rate.unwrap_or(task.completion_rate),
                feedback: patch.feedback.unwrap_or(task.feedback.clone()),
                updated_at: now,
                ..task
            };

            write_task(conn, &updated)?;
            Ok(Some(updated))
        })
    }

    /// Delete a task. Children are detached, not deleted.
    /// Returns false if the task does not exist for this user.
    pub fn delete_task(&self, user_id: &str, task_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![task_id, user_id],
            )?;
            if deleted > 0 {
                debug!(task_id, user = %user_id, "Deleted task");
            }
            Ok(deleted > 0)
        })
    }

    /// Mark a task archived by its owner.
    pub fn archive_task(
        &self,
        user_id: &str,
        task_id: i64,
        reason: Option<String>,
    ) -> Result<Option<Task>> {
        self.update_task(
            user_id,
            task_id,
            TaskPatch {
                is_archived: Some(true),
                archive_reason: Some(reason),
                ..TaskPatch::default()
            },
        )
    }

    /// Flip the status with the single-button toggle table.
    pub fn toggle_task_status(&self, user_id: &str, task_id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let Some(mut task) = get_task_internal(conn, user_id, task_id)? else {
                return Ok(None);
            };
            task.status = toggle_status(task.status);
            task.updated_at = now_ms();
            write_task(conn, &task)?;
            Ok(Some(task))
        })
    }

    /// Apply an explicit transition, rejecting it from the wrong state.
    pub fn transition_task(
        &self,
        user_id: &str,
        task_id: i64,
        transition: Transition,
    ) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let Some(mut task) = get_task_internal(conn, user_id, task_id)? else {
                return Ok(None);
            };
            let next = transition.apply(task.status).ok_or_else(|| {
                ApiError::invalid_state(task_id, task.status.as_str(), transition.verb())
            })?;
            task.status = next;
            task.updated_at = now_ms();
            write_task(conn, &task)?;
            Ok(Some(task))
        })
    }

    /// Store a nested draft depth-first, parent before children.
    ///
    /// Each row is written on its own; if a write fails midway, the tasks
    /// already created stay in place. All tasks start as `pending_approval`.
    /// Returns the created tasks in creation order.
    pub fn create_task_tree(
        &self,
        user_id: &str,
        draft: &TaskDraft,
        parent_id: Option<i64>,
    ) -> Result<Vec<Task>> {
        validate_draft(draft)?;
        if let Some(pid) = parent_id {
            self.with_conn(|conn| ensure_parent(conn, user_id, None, pid))?;
        }

        let mut created = Vec::with_capacity(draft.count());
        self.create_tree_recursive(user_id, draft, parent_id, &mut created)?;
        debug!(count = created.len(), user = %user_id, "Materialized task tree");
        Ok(created)
    }

    fn create_tree_recursive(
        &self,
        user_id: &str,
        draft: &TaskDraft,
        parent_id: Option<i64>,
        created: &mut Vec<Task>,
    ) -> Result<()> {
        let due_date = match draft.deadline.as_deref() {
            Some(v) => parse_timestamp("deadline", v)?,
            None => end_of_day(Local::now()),
        };

        let task = self.with_conn(|conn| {
            insert_task(
                conn,
                user_id,
                InsertTask {
                    title: &draft.title,
                    description: draft.description.as_deref(),
                    due_date,
                    important: draft.important,
                    urgent: draft.urgent,
                    status: TaskStatus::PendingApproval,
                    period: draft.period.as_deref(),
                    parent_id,
                    remind_at: None,
                    remind_type: None,
                },
            )
        })?;

        let id = task.id;
        created.push(task);
        for child in &draft.children {
            self.create_tree_recursive(user_id, child, Some(id), created)?;
        }
        Ok(())
    }
}
