use argon2::{
    password_hash::{PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::{User, UserStatistics};
use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;
use crate::web::session;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub total_quizzes: i32,
    pub total_mood_entries: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub wellness_points: i32,
}

impl From<&UserStatistics> for StatsDto {
    fn from(stats: &UserStatistics) -> Self {
        Self {
            total_quizzes: stats.total_quizzes,
            total_mood_entries: stats.total_mood_entries,
            current_streak: stats.current_streak,
            longest_streak: stats.longest_streak,
            wellness_points: stats.wellness_points,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
    pub stats: Option<StatsDto>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state)
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut rand_core::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<RegisterResponse> {
    let username = payload.username.trim();
    let email = payload.email.trim();
    if username.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("All fields are required"));
    }

    // Keyed by email so a flood of signup attempts for one address is cut off.
    if !state.login_limiter.check(&email.to_lowercase()).await {
        return Err(ApiError::RateLimited);
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .store
        .create_user(crate::store::NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await?;

    let (token, expires_at) = session::issue_token(user.id, &state.session_key)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;
    state
        .store
        .insert_session(user.id, &token, expires_at)
        .await?;

    tracing::info!(user_id = user.id, "registered new user");

    Ok(Json(RegisterResponse {
        token,
        user: UserDto::from(&user),
    }))
}

async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let login_id = payload.email.trim();
    if login_id.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("All fields are required"));
    }

    if !state.login_limiter.check(&login_id.to_lowercase()).await {
        tracing::warn!("login rate limit hit for {login_id}");
        return Err(ApiError::RateLimited);
    }

    let user = state
        .store
        .find_user_by_login(login_id)
        .await?
        .filter(|u| u.is_active);

    let verified = match &user {
        Some(u) => verify_password(&payload.password, &u.password_hash),
        None => false,
    };
    let Some(user) = user.filter(|_| verified) else {
        return Err(ApiError::auth("Invalid credentials"));
    };

    let (token, expires_at) = session::issue_token(user.id, &state.session_key)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;
    state
        .store
        .record_login(user.id, &token, expires_at)
        .await?;

    let stats = state.store.get_statistics(user.id).await?;

    tracing::info!(user_id = user.id, "user logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserDto::from(&user),
        stats: stats.as_ref().map(StatsDto::from),
    }))
}
