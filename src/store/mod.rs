use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::achievements::Badge;
use crate::domain::models::{
    Achievement, ActivityFeedItem, ActivityRecord, ChatMessage, MoodEntry, QuestionThread,
    QuizResponse, User, UserStatistics,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Duplicate(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewQuizResponse {
    pub week_number: i64,
    pub responses: Vec<i32>,
    pub score: i32,
    pub level: String,
}

#[derive(Debug, Clone)]
pub struct NewMoodEntry {
    pub mood: String,
    pub mood_value: i16,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_anonymous: bool,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: i64,
    pub activity_type: String,
    pub description: Option<String>,
    pub page_url: Option<String>,
}

/// Result of a quiz submission: the stored row, the refreshed statistics and
/// any badges this submission unlocked.
#[derive(Debug, Clone)]
pub struct QuizOutcome {
    pub response: QuizResponse,
    pub stats: UserStatistics,
    pub new_badges: Vec<&'static Badge>,
}

#[derive(Debug, Clone)]
pub struct MoodOutcome {
    pub entry: MoodEntry,
    pub stats: UserStatistics,
    pub new_badges: Vec<&'static Badge>,
}

/// Persistence boundary. Backed by Postgres in production and by an
/// in-memory table set in tests and demos.
///
/// The record_* methods are composite: the write, the statistics refresh and
/// the achievement awards happen in one atomic unit, so a crash can never
/// leave counters behind rows. `today` is passed in so day-based derivations
/// stay deterministic.
#[async_trait]
pub trait WellnessStore: Send + Sync {
    /// Creates the user plus a zeroed statistics row. Duplicate username or
    /// email (case-insensitive) yields `StoreError::Duplicate`.
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;

    /// Looks the user up by email or username, case-insensitively.
    async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, user_id: i64) -> StoreResult<Option<User>>;

    async fn insert_session(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Touches last_login, drops the user's expired sessions and stores the
    /// fresh one.
    async fn record_login(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    async fn record_quiz_response(
        &self,
        user_id: i64,
        new: NewQuizResponse,
        today: NaiveDate,
    ) -> StoreResult<QuizOutcome>;

    /// Newest first.
    async fn list_quiz_responses(&self, user_id: i64) -> StoreResult<Vec<QuizResponse>>;

    /// Saves the mood for `today`, overwriting an existing entry for the
    /// same day.
    async fn record_mood_entry(
        &self,
        user_id: i64,
        new: NewMoodEntry,
        today: NaiveDate,
    ) -> StoreResult<MoodOutcome>;

    /// Oldest first.
    async fn list_mood_entries(&self, user_id: i64) -> StoreResult<Vec<MoodEntry>>;

    /// Newest first, capped at `limit`.
    async fn recent_mood_entries(&self, user_id: i64, limit: i64) -> StoreResult<Vec<MoodEntry>>;

    /// Recomputes and persists the statistics row from the user's stored
    /// rows. Safe to call repeatedly.
    async fn refresh_statistics(&self, user_id: i64, today: NaiveDate)
        -> StoreResult<UserStatistics>;

    async fn get_statistics(&self, user_id: i64) -> StoreResult<Option<UserStatistics>>;

    /// In unlock order.
    async fn list_achievements(&self, user_id: i64) -> StoreResult<Vec<Achievement>>;

    async fn insert_chat_message(
        &self,
        user_id: i64,
        message: &str,
        response: &str,
        category: &str,
    ) -> StoreResult<ChatMessage>;

    /// Newest first, capped at `limit`.
    async fn list_chat_history(&self, user_id: i64, limit: i64) -> StoreResult<Vec<ChatMessage>>;

    async fn create_question(&self, user_id: i64, new: NewQuestion) -> StoreResult<i64>;

    /// Threads newest first, replies within a thread oldest first.
    async fn list_questions(&self) -> StoreResult<Vec<QuestionThread>>;

    async fn add_reply(
        &self,
        question_id: i64,
        user_id: i64,
        content: &str,
        is_anonymous: bool,
    ) -> StoreResult<i64>;

    async fn log_activity(&self, activity: NewActivity) -> StoreResult<()>;

    /// Newest first, capped at `limit`.
    async fn list_user_activities(
        &self,
        user_id: i64,
        limit: i64,
    ) -> StoreResult<Vec<ActivityRecord>>;

    /// Newest first across all users, capped at `limit`.
    async fn list_recent_activities(&self, limit: i64) -> StoreResult<Vec<ActivityFeedItem>>;
}
