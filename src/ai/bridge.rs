//! Conversation and task generation on top of a completion provider.

use super::prompt::system_prompt;
use super::{ChatMessage, CompletionProvider, ProviderError, Role, extract_task_draft};
use crate::error::{ApiError, ApiResult};
use crate::types::{Personality, TaskDraft};
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Canned suggestions served when the provider is unavailable.
const FALLBACK_REPLIES: [&str; 5] = [
    "Based on how your recent tasks went, start today with the high-priority items you have not finished yet, then set aside some time to learn something new.",
    "Today's suggestion: finish the important task left over from yesterday first, take a short break, and start on new work in the afternoon.",
    "Focus today on the tasks marked urgent in your list. Once they are done, give yourself some time to relax.",
    "Looking at your task history, today is a good day for creative work. Try scheduling something that needs deep thinking.",
    "Suggested plan for today: routine work in the morning, long-term projects in the afternoon, and a short review in the evening.",
];

/// Pick a fallback suggestion from `seed`.
pub fn fallback_reply(seed: u64) -> &'static str {
    FALLBACK_REPLIES[(seed % FALLBACK_REPLIES.len() as u64) as usize]
}

/// Reply plus the draft parsed from it.
#[derive(Debug, Clone)]
pub struct Generated {
    pub reply: String,
    pub draft: TaskDraft,
}

/// Time-bounded access to the planning assistant.
#[derive(Clone)]
pub struct AiBridge {
    provider: Arc<dyn CompletionProvider>,
    timeout: Duration,
}

impl AiBridge {
    pub fn new(provider: Arc<dyn CompletionProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Conversational reply. Provider failures and timeouts are answered
    /// with a fallback suggestion; only an invalid transcript is an error.
    pub async fn respond(
        &self,
        personality: Option<&Personality>,
        transcript: &[ChatMessage],
    ) -> ApiResult<String> {
        let messages = build_messages(personality, transcript)?;
        match self.call(&messages).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                warn!(error = %e, "Completion failed, serving fallback reply");
                let seed = Local::now().timestamp_millis().unsigned_abs();
                Ok(fallback_reply(seed).to_string())
            }
        }
    }

    /// Structured generation. Provider failures surface as ProviderError,
    /// a reply without a usable ```task block as ParseError.
    pub async fn generate(
        &self,
        personality: Option<&Personality>,
        transcript: &[ChatMessage],
    ) -> ApiResult<Generated> {
        let messages = build_messages(personality, transcript)?;
        let reply = self.call(&messages).await.map_err(|e| {
            warn!(error = %e, "Task generation failed");
            ApiError::provider(e)
        })?;
        let draft = extract_task_draft(&reply).map_err(|e| ApiError::parse(e.to_string()))?;
        info!(title = %draft.title, tasks = draft.count(), "Generated task draft");
        Ok(Generated { reply, draft })
    }

    async fn call(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        match tokio::time::timeout(self.timeout, self.provider.complete(messages)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }
}

/// Prepend the system instruction to a validated transcript.
fn build_messages(
    personality: Option<&Personality>,
    transcript: &[ChatMessage],
) -> ApiResult<Vec<ChatMessage>> {
    if transcript.is_empty() {
        return Err(ApiError::missing_field("messages"));
    }
    if transcript.iter().any(|m| m.role == Role::System) {
        return Err(ApiError::invalid_value(
            "messages",
            "transcript turns must be from user or assistant",
        ));
    }

    let today = Local::now().date_naive();
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(ChatMessage::system(system_prompt(personality, today)));
    messages.extend_from_slice(transcript);
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_reply_cycles() {
        assert_eq!(fallback_reply(0), FALLBACK_REPLIES[0]);
        assert_eq!(fallback_reply(7), FALLBACK_REPLIES[2]);
    }

    #[test]
    fn test_build_messages_prepends_system() {
        let messages = build_messages(None, &[ChatMessage::user("hi")]).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1], ChatMessage::user("hi"));
    }

    #[test]
    fn test_build_messages_rejects_bad_transcripts() {
        assert!(build_messages(None, &[]).is_err());
        let err = build_messages(None, &[ChatMessage::system("override")]).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("messages"));
    }
}
