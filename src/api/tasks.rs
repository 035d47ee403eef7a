//! Task routes.

use super::AppState;
use super::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::filter::{TaskFilter, TaskFilterParams};
use crate::hierarchy::assemble_forest;
use crate::status::Transition;
use crate::types::{NewTask, Task, TaskPatch, TaskTree};
use axum::Extension;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Local;
use serde::Deserialize;

fn visible_tasks(
    state: &AppState,
    user: &CurrentUser,
    query: Result<Query<TaskFilterParams>, QueryRejection>,
) -> ApiResult<Vec<Task>> {
    let Query(params) = query?;
    let filter = TaskFilter::try_from(params)?;
    let tasks = state.db.list_tasks(user.id())?;
    Ok(filter.apply(tasks, Local::now()))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    query: Result<Query<TaskFilterParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(visible_tasks(&state, &user, query)?))
}

/// Filtered tasks nested under their parents.
pub async fn tree(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    query: Result<Query<TaskFilterParams>, QueryRejection>,
) -> ApiResult<Json<Vec<TaskTree>>> {
    let tasks = visible_tasks(&state, &user, query)?;
    Ok(Json(assemble_forest(tasks).trees()))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(input) = payload?;
    let task = state.db.create_task(user.id(), input)?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_one(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    let task = state
        .db
        .get_task(user.id(), id)?
        .ok_or_else(|| ApiError::task_not_found(id))?;
    Ok(Json(task))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    let task = state
        .db
        .update_task(user.id(), id, patch)?
        .ok_or_else(|| ApiError::task_not_found(id))?;
    Ok(Json(task))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    if state.db.delete_task(user.id(), id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::task_not_found(id))
    }
}

pub async fn children(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Path(id) = path?;
    if state.db.get_task(user.id(), id)?.is_none() {
        return Err(ApiError::task_not_found(id));
    }
    Ok(Json(state.db.get_children(user.id(), id)?))
}

/// Parent of a task, or `null` for a top-level task.
pub async fn parent(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Option<Task>>> {
    let Path(id) = path?;
    if state.db.get_task(user.id(), id)?.is_none() {
        return Err(ApiError::task_not_found(id));
    }
    Ok(Json(state.db.get_parent(user.id(), id)?))
}

pub async fn toggle(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    let task = state
        .db
        .toggle_task_status(user.id(), id)?
        .ok_or_else(|| ApiError::task_not_found(id))?;
    Ok(Json(task))
}

fn transition(state: &AppState, user: &CurrentUser, id: i64, t: Transition) -> ApiResult<Json<Task>> {
    let task = state
        .db
        .transition_task(user.id(), id, t)?
        .ok_or_else(|| ApiError::task_not_found(id))?;
    Ok(Json(task))
}

pub async fn approve(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    transition(&state, &user, id, Transition::Approve)
}

pub async fn complete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    transition(&state, &user, id, Transition::Complete)
}

pub async fn reopen(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    transition(&state, &user, id, Transition::Reopen)
}

#[derive(Debug, Default, Deserialize)]
pub struct ArchiveRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn archive(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    // The body is optional, with or without a content type
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ArchiveRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::invalid_value("body", &e.to_string()))?
    };
    let task = state
        .db
        .archive_task(user.id(), id, request.reason)?
        .ok_or_else(|| ApiError::task_not_found(id))?;
    Ok(Json(task))
}
