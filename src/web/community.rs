use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;
use crate::store::NewQuestion;
use crate::web::session::{ensure_owner, AuthedUser};

const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuestionRequest {
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub is_anonymous: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostReplyRequest {
    pub user_id: i64,
    pub content: String,
    pub is_anonymous: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub id: i64,
    pub username: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub reply_count: i64,
    pub replies: Vec<ReplyDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyDto {
    pub id: i64,
    pub username: String,
    pub content: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuestionResponse {
    pub message: &'static str,
    pub question_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostReplyResponse {
    pub message: &'static str,
    pub reply_id: i64,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/questions", get(list_questions))
        .route("/questions", post(post_question))
        .route("/questions/:id/reply", post(post_reply))
        .with_state(state)
}

fn mask(username: String, is_anonymous: bool) -> String {
    if is_anonymous {
        ANONYMOUS.to_string()
    } else {
        username
    }
}

async fn list_questions(State(state): State<SharedState>) -> ApiResult<Vec<QuestionDto>> {
    let threads = state.store.list_questions().await?;
    Ok(Json(
        threads
            .into_iter()
            .map(|t| QuestionDto {
                id: t.id,
                username: mask(t.username, t.is_anonymous),
                title: t.title,
                content: t.content,
                category: t.category,
                is_anonymous: t.is_anonymous,
                created_at: t.created_at,
                reply_count: t.reply_count,
                replies: t
                    .replies
                    .into_iter()
                    .map(|r| ReplyDto {
                        id: r.id,
                        username: mask(r.username, r.is_anonymous),
                        content: r.content,
                        is_anonymous: r.is_anonymous,
                        created_at: r.created_at,
                    })
                    .collect(),
            })
            .collect(),
    ))
}

async fn post_question(
    AuthedUser(user): AuthedUser,
    State(state): State<SharedState>,
    Json(payload): Json<PostQuestionRequest>,
) -> ApiResult<PostQuestionResponse> {
    ensure_owner(&user, payload.user_id)?;

    let title = payload.title.trim();
    let content = payload.content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(ApiError::validation("Title and content are required"));
    }

    let question_id = state
        .store
        .create_question(
            payload.user_id,
            NewQuestion {
                title: title.to_string(),
                content: content.to_string(),
                category: payload
                    .category
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| "General".to_string()),
                is_anonymous: payload.is_anonymous.unwrap_or(false),
            },
        )
        .await?;

    Ok(Json(PostQuestionResponse {
        message: "Question posted successfully",
        question_id,
    }))
}

async fn post_reply(
    AuthedUser(user): AuthedUser,
    State(state): State<SharedState>,
    Path(question_id): Path<i64>,
    Json(payload): Json<PostReplyRequest>,
) -> ApiResult<PostReplyResponse> {
    ensure_owner(&user, payload.user_id)?;

    let content = payload.content.trim();
    if content.is_empty() {
        return Err(ApiError::validation("Content is required"));
    }

    let reply_id = state
        .store
        .add_reply(
            question_id,
            payload.user_id,
            content,
            payload.is_anonymous.unwrap_or(false),
        )
        .await?;

    Ok(Json(PostReplyResponse {
        message: "Reply added successfully",
        reply_id,
    }))
}
