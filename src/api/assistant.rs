//! Assistant routes: free-form chat and structured task generation.

use super::AppState;
use super::auth::CurrentUser;
use crate::ai::ChatMessage;
use crate::error::ApiResult;
use crate::types::Task;
use axum::Extension;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Attach generated tasks under this existing task.
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct GeneratedTasks {
    pub message: String,
    /// Created tasks, parents before their children.
    pub tasks: Vec<Task>,
}

/// Conversational reply. Falls back to a canned suggestion when the
/// provider is unavailable.
pub async fn chat(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatReply>> {
    let Json(request) = payload?;
    let personality = state.db.get_personality(user.id())?;
    let message = state.ai.respond(personality.as_ref(), &request.messages).await?;
    Ok(Json(ChatReply { message }))
}

/// Generate a task tree and store it for approval.
pub async fn generate(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GeneratedTasks>)> {
    let Json(request) = payload?;
    let personality = state.db.get_personality(user.id())?;
    let generated = state
        .ai
        .generate(personality.as_ref(), &request.messages)
        .await?;
    let tasks = state
        .db
        .create_task_tree(user.id(), &generated.draft, request.parent_id)?;
    Ok((
        StatusCode::CREATED,
        Json(GeneratedTasks {
            message: generated.reply,
            tasks,
        }),
    ))
}
