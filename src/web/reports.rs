use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::services::{email, report};
use crate::state::SharedState;
use crate::web::session::{ensure_owner, AuthedUser};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReportResponse {
    pub message: &'static str,
    pub report_data: report::ReportPayload,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/send/:user_id", post(send))
        .with_state(state)
}

async fn send(
    AuthedUser(session_user): AuthedUser,
    State(state): State<SharedState>,
    Path(user_id): Path<i64>,
) -> ApiResult<SendReportResponse> {
    ensure_owner(&session_user, user_id)?;

    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let report_data = report::build_report(state.store.as_ref(), &user).await?;
    email::send_report(&report_data);

    Ok(Json(SendReportResponse {
        message: "Report sent successfully",
        report_data,
    }))
}
