//! AI suggestion bridge.
//!
//! The assistant is reached through a [`CompletionProvider`]. The HTTP
//! implementation speaks the OpenAI-compatible chat completions protocol;
//! tests substitute their own providers.

pub mod bridge;
pub mod client;
pub mod extract;
pub mod prompt;

pub use bridge::{AiBridge, Generated, fallback_reply};
pub use client::ChatCompletionsClient;
pub use extract::{ExtractError, extract_task_draft};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Errors from the completion provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("completion request failed: {message}")]
    RequestFailed { message: String },

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("provider returned no reply text")]
    EmptyReply,

    #[error("failed to decode provider response: {message}")]
    Decode { message: String },

    #[error("no API key configured; set {env_var}")]
    MissingApiKey { env_var: String },
}

/// A chat completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send the full message list and return the assistant's reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;
}
