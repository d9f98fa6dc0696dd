use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::mood::mood_to_value;
use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;
use crate::store::NewMoodEntry;
use crate::web::session::{ensure_owner, AuthedUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub user_id: i64,
    pub mood: String,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub message: &'static str,
    pub id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntryDto {
    pub id: i64,
    pub mood: String,
    pub mood_value: i16,
    pub note: Option<String>,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/save", post(save))
        .route("/:user_id", get(history))
        .with_state(state)
}

async fn save(
    AuthedUser(user): AuthedUser,
    State(state): State<SharedState>,
    Json(payload): Json<SaveRequest>,
) -> ApiResult<SaveResponse> {
    ensure_owner(&user, payload.user_id)?;

    let mood = payload.mood.trim();
    if mood.is_empty() {
        return Err(ApiError::validation("Mood is required"));
    }

    let outcome = state
        .store
        .record_mood_entry(
            payload.user_id,
            NewMoodEntry {
                mood: mood.to_string(),
                mood_value: mood_to_value(mood),
                note: payload.note.filter(|n| !n.trim().is_empty()),
            },
            Utc::now().date_naive(),
        )
        .await?;

    Ok(Json(SaveResponse {
        message: "Mood saved successfully",
        id: outcome.entry.id,
    }))
}

async fn history(
    AuthedUser(user): AuthedUser,
    State(state): State<SharedState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Vec<MoodEntryDto>> {
    ensure_owner(&user, user_id)?;

    let entries = state.store.list_mood_entries(user_id).await?;
    Ok(Json(
        entries
            .into_iter()
            .map(|e| MoodEntryDto {
                id: e.id,
                mood: e.mood,
                mood_value: e.mood_value,
                note: e.note,
                entry_date: e.entry_date,
                created_at: e.created_at,
            })
            .collect(),
    ))
}
