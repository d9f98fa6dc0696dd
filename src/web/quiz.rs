use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::scoring::{self, QuizQuestion, WellnessLevel, CRISIS_RESOURCES, QUESTIONS};
use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;
use crate::store::NewQuizResponse;
use crate::web::session::{ensure_owner, AuthedUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub user_id: i64,
    pub responses: Vec<i32>,
    pub week_number: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDto {
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStats {
    pub total_quizzes: i32,
    pub current_streak: i32,
    pub wellness_points: i32,
    /// Every badge the user holds, not just the ones this submission added.
    pub badges: Vec<BadgeDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub score: i32,
    pub level: &'static str,
    pub message: String,
    pub user_stats: SubmitStats,
    pub new_badges: Vec<BadgeDto>,
    pub recommendation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crisis_resources: Option<[&'static str; 2]>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/questions", get(questions))
        .route("/submit", post(submit))
        .with_state(state)
}

async fn questions() -> Json<Vec<QuizQuestion>> {
    Json(QUESTIONS.to_vec())
}

async fn submit(
    AuthedUser(user): AuthedUser,
    State(state): State<SharedState>,
    Json(payload): Json<SubmitRequest>,
) -> ApiResult<SubmitResponse> {
    ensure_owner(&user, payload.user_id)?;

    if payload.responses.is_empty() {
        return Err(ApiError::validation("Responses are required"));
    }
    if payload.responses.len() > QUESTIONS.len() {
        return Err(ApiError::validation("Too many responses"));
    }
    if payload.responses.iter().any(|&r| !(0..=3).contains(&r)) {
        return Err(ApiError::validation("Responses must be between 0 and 3"));
    }

    let score = scoring::score_responses(&payload.responses);
    let level = WellnessLevel::from_score(score);

    let outcome = state
        .store
        .record_quiz_response(
            payload.user_id,
            NewQuizResponse {
                week_number: payload.week_number,
                responses: payload.responses,
                score,
                level: level.label().to_string(),
            },
            Utc::now().date_naive(),
        )
        .await?;

    let new_badges: Vec<BadgeDto> = outcome
        .new_badges
        .iter()
        .map(|b| BadgeDto {
            name: b.name.to_string(),
            icon: b.icon.to_string(),
            description: b.description.to_string(),
        })
        .collect();

    // The stats block mirrors the gamification summary: the full earned set.
    let badges = state
        .store
        .list_achievements(payload.user_id)
        .await?
        .into_iter()
        .map(|a| BadgeDto {
            name: a.achievement_name,
            icon: a.icon,
            description: a.description,
        })
        .collect();

    tracing::info!(
        user_id = payload.user_id,
        score,
        level = level.label(),
        "assessment recorded"
    );

    Ok(Json(SubmitResponse {
        score,
        level: level.label(),
        message: format!("Assessment complete. Score: {score}/30"),
        user_stats: SubmitStats {
            total_quizzes: outcome.stats.total_quizzes,
            current_streak: outcome.stats.current_streak,
            wellness_points: outcome.stats.wellness_points,
            badges,
        },
        new_badges,
        recommendation: level.recommendation(),
        crisis_resources: level.is_crisis().then_some(CRISIS_RESOURCES),
    }))
}
