//! Markdown rendering of task forests for the CLI.

use crate::hierarchy::Forest;
use crate::status::category;
use crate::types::{Task, TaskStatus};
use chrono::{Local, TimeZone};

fn checkbox(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => "[x]",
        TaskStatus::Pending => "[ ]",
        TaskStatus::PendingApproval => "[?]",
    }
}

fn format_due(ms: i64) -> Option<String> {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
}

/// One markdown list item for a task, without indentation.
pub fn format_task_line(task: &Task) -> String {
    let mut line = format!(
        "- {} **{}** `#{}` ({})",
        checkbox(task.status),
        task.title,
        task.id,
        category(task.important, task.urgent).label()
    );

    if let Some(due) = task.due_date.and_then(format_due) {
        line.push_str(&format!(" due {}", due));
    }
    if let Some(ref period) = task.period {
        line.push_str(&format!(" [{}]", period));
    }
    if task.is_archived {
        line.push_str(" _archived_");
    }
    line
}

/// Render the forest as a nested markdown list.
pub fn format_forest_markdown(forest: &Forest) -> String {
    let mut md = String::new();
    let count = forest.len();
    md.push_str(&format!("# Tasks ({})\n\n", count));

    if count == 0 {
        md.push_str("_No tasks._\n");
        return md;
    }

    forest.walk(|task, depth| {
        md.push_str(&"  ".repeat(depth));
        md.push_str(&format_task_line(task));
        md.push('\n');
    });
    md
}
