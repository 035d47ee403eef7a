//! Pull a task draft out of an assistant reply.

use crate::dates::parse_timestamp;
use crate::types::TaskDraft;
use regex_lite::Regex;
use thiserror::Error;

const TASK_FENCE: &str = r"(?s)```task[ \t]*\r?\n(.*?)```";

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("reply contains no ```task block")]
    NoBlock,

    #[error("task block is not valid JSON: {0}")]
    Malformed(String),

    #[error("task block has a task without a title")]
    MissingTitle,

    #[error("task block has an unreadable deadline '{deadline}'")]
    BadDeadline { deadline: String },
}

/// Find the first fenced block tagged `task` and parse it as a draft.
///
/// Blocks with other tags (```json, ```) are ignored. Every node of the
/// draft must have a non-blank title and, if it has a deadline, one that
/// parses as a timestamp.
pub fn extract_task_draft(reply: &str) -> Result<TaskDraft, ExtractError> {
    let re = Regex::new(TASK_FENCE).map_err(|e| ExtractError::Malformed(e.to_string()))?;
    let body = re
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(ExtractError::NoBlock)?;

    let draft: TaskDraft =
        serde_json::from_str(body.trim()).map_err(|e| ExtractError::Malformed(e.to_string()))?;

    check_node(&draft)?;
    Ok(draft)
}

fn check_node(draft: &TaskDraft) -> Result<(), ExtractError> {
    if draft.title.trim().is_empty() {
        return Err(ExtractError::MissingTitle);
    }
    if let Some(deadline) = draft.deadline.as_deref() {
        if parse_timestamp("deadline", deadline).is_err() {
            return Err(ExtractError::BadDeadline {
                deadline: deadline.to_string(),
            });
        }
    }
    draft.children.iter().try_for_each(check_node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_nested_draft() {
        let reply = "Here is your plan:\n```task\n{\"title\":\"Plan\",\"children\":[{\"title\":\"Step1\"},{\"title\":\"Step2\"}]}\n```\nGood luck!";
        let draft = extract_task_draft(reply).unwrap();
        assert_eq!(draft.title, "Plan");
        assert_eq!(draft.children.len(), 2);
        assert_eq!(draft.children[1].title, "Step2");
    }

    #[test]
    fn test_no_block() {
        assert_eq!(
            extract_task_draft("Sure, tell me more about your goal."),
            Err(ExtractError::NoBlock)
        );
    }

    #[test]
    fn test_other_fences_ignored() {
        let reply = "```json\n{\"title\":\"Nope\"}\n```";
        assert_eq!(extract_task_draft(reply), Err(ExtractError::NoBlock));
    }

    #[test]
    fn test_malformed_json() {
        let reply = "```task\n{\"title\": \"Plan\",\n```";
        assert!(matches!(
            extract_task_draft(reply),
            Err(ExtractError::Malformed(_))
        ));
    }

    #[test]
    fn test_blank_child_title_rejected() {
        let reply = "```task\n{\"title\":\"Plan\",\"children\":[{\"title\":\"  \"}]}\n```";
        assert_eq!(extract_task_draft(reply), Err(ExtractError::MissingTitle));
    }

    #[test]
    fn test_unreadable_child_deadline_rejected() {
        let reply = "```task\n{\"title\":\"Plan\",\"deadline\":\"2024-05-01T23:59:00\",\"children\":[{\"title\":\"Step1\",\"deadline\":\"next friday\"}]}\n```";
        assert_eq!(
            extract_task_draft(reply),
            Err(ExtractError::BadDeadline {
                deadline: "next friday".to_string()
            })
        );
    }

    #[test]
    fn test_first_block_wins() {
        let reply = "```task\n{\"title\":\"First\"}\n```\n```task\n{\"title\":\"Second\"}\n```";
        assert_eq!(extract_task_draft(reply).unwrap().title, "First");
    }
}
