use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::SharedState;
use crate::store::NewActivity;
use crate::web::session::{ensure_owner, AdminUser, AuthedUser};

const USER_FEED_LIMIT: i64 = 50;
const ADMIN_FEED_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRequest {
    pub user_id: i64,
    pub activity_type: String,
    pub description: Option<String>,
    pub page_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDto {
    pub id: i64,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub activity_type: String,
    pub description: Option<String>,
    pub page_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/log", post(log))
        .route("/user/:user_id", get(user_feed))
        .route("/all", get(admin_feed))
        .with_state(state)
}

/// Telemetry only. A failed write is logged and dropped so it can never
/// break the page that reported it.
async fn log(
    AuthedUser(user): AuthedUser,
    State(state): State<SharedState>,
    Json(payload): Json<LogRequest>,
) -> ApiResult<LogResponse> {
    ensure_owner(&user, payload.user_id)?;

    if let Err(err) = state
        .store
        .log_activity(NewActivity {
            user_id: payload.user_id,
            activity_type: payload.activity_type,
            description: payload.description,
            page_url: payload.page_url,
        })
        .await
    {
        tracing::warn!(user_id = payload.user_id, "activity log write failed: {err}");
    }

    Ok(Json(LogResponse {
        message: "Activity logged successfully",
    }))
}

async fn user_feed(
    AuthedUser(user): AuthedUser,
    State(state): State<SharedState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Vec<ActivityDto>> {
    ensure_owner(&user, user_id)?;

    let records = state
        .store
        .list_user_activities(user_id, USER_FEED_LIMIT)
        .await?;
    Ok(Json(
        records
            .into_iter()
            .map(|a| ActivityDto {
                id: a.id,
                user_id: a.user_id,
                username: None,
                activity_type: a.activity_type,
                description: a.description,
                page_url: a.page_url,
                created_at: a.created_at,
            })
            .collect(),
    ))
}

async fn admin_feed(
    AdminUser(_admin): AdminUser,
    State(state): State<SharedState>,
) -> ApiResult<Vec<ActivityDto>> {
    let records = state.store.list_recent_activities(ADMIN_FEED_LIMIT).await?;
    Ok(Json(
        records
            .into_iter()
            .map(|a| ActivityDto {
                id: a.id,
                user_id: a.user_id,
                username: Some(a.username),
                activity_type: a.activity_type,
                description: a.description,
                page_url: a.page_url,
                created_at: a.created_at,
            })
            .collect(),
    ))
}
