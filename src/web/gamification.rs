use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::SharedState;
use crate::web::session::{ensure_owner, AuthedUser};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadgeDto {
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamificationResponse {
    pub total_quizzes: i32,
    pub total_mood_entries: i32,
    pub current_streak: i32,
    pub points: i32,
    pub badges: Vec<EarnedBadgeDto>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/:user_id", get(summary))
        .with_state(state)
}

async fn summary(
    AuthedUser(user): AuthedUser,
    State(state): State<SharedState>,
    Path(user_id): Path<i64>,
) -> ApiResult<GamificationResponse> {
    ensure_owner(&user, user_id)?;

    // The streak is a sliding window, so re-derive before answering rather
    // than trusting the value persisted at the last write.
    let stats = state
        .store
        .refresh_statistics(user_id, Utc::now().date_naive())
        .await?;
    let badges = state.store.list_achievements(user_id).await?;

    Ok(Json(GamificationResponse {
        total_quizzes: stats.total_quizzes,
        total_mood_entries: stats.total_mood_entries,
        current_streak: stats.current_streak,
        points: stats.wellness_points,
        badges: badges
            .into_iter()
            .map(|a| EarnedBadgeDto {
                name: a.achievement_name,
                icon: a.icon,
                description: a.description,
            })
            .collect(),
    }))
}
