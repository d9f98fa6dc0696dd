use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::chatbot;
use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;
use crate::web::session::{ensure_owner, AuthedUser};

const HISTORY_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub user_id: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryDto {
    pub id: i64,
    pub message: String,
    pub response: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/history/:user_id", get(history))
        .with_state(state)
}

async fn chat(
    AuthedUser(user): AuthedUser,
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    ensure_owner(&user, payload.user_id)?;

    let message = payload.message.trim();
    if message.is_empty() {
        return Err(ApiError::validation("Message is required"));
    }

    let reply = chatbot::respond(message);
    state
        .store
        .insert_chat_message(payload.user_id, message, reply.text, reply.topic.as_str())
        .await?;

    Ok(Json(ChatResponse {
        response: reply.text,
    }))
}

async fn history(
    AuthedUser(user): AuthedUser,
    State(state): State<SharedState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Vec<ChatHistoryDto>> {
    ensure_owner(&user, user_id)?;

    let messages = state.store.list_chat_history(user_id, HISTORY_LIMIT).await?;
    Ok(Json(
        messages
            .into_iter()
            .map(|m| ChatHistoryDto {
                id: m.id,
                message: m.message,
                response: m.response,
                category: m.category,
                created_at: m.created_at,
            })
            .collect(),
    ))
}
