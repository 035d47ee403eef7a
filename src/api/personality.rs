//! Personality profile routes.

use super::AppState;
use super::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::types::{Personality, PersonalityInput};
use axum::Extension;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;

/// The saved profile; 404 until one has been saved.
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Personality>> {
    let personality = state
        .db
        .get_personality(user.id())?
        .ok_or_else(ApiError::personality_not_found)?;
    Ok(Json(personality))
}

pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<PersonalityInput>, JsonRejection>,
) -> ApiResult<Json<Personality>> {
    let Json(input) = payload?;
    Ok(Json(state.db.upsert_personality(user.id(), input)?))
}
