//! Task list filters applied before forest assembly.

use crate::dates::{is_same_local_day, start_of_month, start_of_week};
use crate::error::{ApiError, ApiResult};
use crate::status::{Quadrant, category};
use crate::types::{Task, TaskStatus};
use chrono::{DateTime, Local};
use serde::Deserialize;

/// Due-date window relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Today,
    ThisWeek,
    ThisMonth,
}

impl DateRange {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "today" => Some(DateRange::Today),
            "this_week" => Some(DateRange::ThisWeek),
            "this_month" => Some(DateRange::ThisMonth),
            _ => None,
        }
    }
}

/// Filter over a user's tasks. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub quadrant: Option<Quadrant>,
    pub period: Option<String>,
    pub date_range: Option<DateRange>,
    pub hide_archived: bool,
}

/// Raw query-string form of [`TaskFilter`]; `all` or empty means unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilterParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub period: Option<String>,
    pub date_range: Option<String>,
    #[serde(default)]
    pub hide_archived: bool,
}

fn selected(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "all")
}

impl TryFrom<TaskFilterParams> for TaskFilter {
    type Error = ApiError;

    fn try_from(params: TaskFilterParams) -> ApiResult<Self> {
        let status = match selected(params.status) {
            Some(s) => Some(
                TaskStatus::parse(&s)
                    .ok_or_else(|| ApiError::invalid_value("status", "unknown status"))?,
            ),
            None => None,
        };
        let quadrant = match selected(params.priority) {
            Some(p) => Some(
                Quadrant::parse(&p)
                    .ok_or_else(|| ApiError::invalid_value("priority", "unknown priority"))?,
            ),
            None => None,
        };
        let date_range = match selected(params.date_range) {
            Some(r) => Some(
                DateRange::parse(&r)
                    .ok_or_else(|| ApiError::invalid_value("dateRange", "unknown date range"))?,
            ),
            None => None,
        };

        Ok(TaskFilter {
            status,
            quadrant,
            period: selected(params.period),
            date_range,
            hide_archived: params.hide_archived,
        })
    }
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        *self
            == TaskFilter {
                hide_archived: self.hide_archived,
                ..TaskFilter::default()
            }
    }

    /// Whether `task` passes every set criterion, evaluated at `now`.
    pub fn matches(&self, task: &Task, now: DateTime<Local>) -> bool {
        if self.hide_archived && task.is_archived {
            return false;
        }
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(quadrant) = self.quadrant {
            if category(task.important, task.urgent) != quadrant {
                return false;
            }
        }
        if let Some(ref period) = self.period {
            if task.period.as_deref() != Some(period.as_str()) {
                return false;
            }
        }
        // Undated tasks pass any date window.
        if let (Some(range), Some(due)) = (self.date_range, task.due_date) {
            let inside = match range {
                DateRange::Today => is_same_local_day(due, now),
                DateRange::ThisWeek => due >= start_of_week(now),
                DateRange::ThisMonth => due >= start_of_month(now),
            };
            if !inside {
                return false;
            }
        }
        true
    }

    /// Keep only the tasks that match, preserving order.
    pub fn apply(&self, tasks: Vec<Task>, now: DateTime<Local>) -> Vec<Task> {
        tasks.into_iter().filter(|t| self.matches(t, now)).collect()
    }
}
