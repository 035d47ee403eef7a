//! Daily check-in routes.

use super::AppState;
use super::auth::CurrentUser;
use crate::error::ApiResult;
use axum::Extension;
use axum::extract::State;
use axum::response::Json;
use chrono::Local;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryStatus {
    pub due: bool,
    pub last_inquiry_at: Option<i64>,
}

fn current(state: &AppState, user: &CurrentUser) -> ApiResult<InquiryStatus> {
    let now = Local::now();
    Ok(InquiryStatus {
        due: state.db.inquiry_due(user.id(), now)?,
        last_inquiry_at: state.db.last_inquiry(user.id())?,
    })
}

pub async fn status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<InquiryStatus>> {
    Ok(Json(current(&state, &user)?))
}

/// Mark today's check-in as done.
pub async fn record(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<InquiryStatus>> {
    state.db.record_inquiry(user.id(), Local::now())?;
    Ok(Json(current(&state, &user)?))
}
