use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::domain::stats::StatsSnapshot;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One questionnaire submission. `week_number` is an opaque client-supplied
/// identifier (observed carrying millisecond timestamps), not a week-of-year.
#[derive(Debug, Clone, FromRow)]
pub struct QuizResponse {
    pub id: i64,
    pub user_id: i64,
    pub week_number: i64,
    pub responses: serde_json::Value,
    pub score: i32,
    pub mental_health_level: String,
    pub created_at: DateTime<Utc>,
}

/// At most one entry per user per `entry_date`; same-day saves overwrite.
#[derive(Debug, Clone, FromRow)]
pub struct MoodEntry {
    pub id: i64,
    pub user_id: i64,
    pub mood: String,
    pub mood_value: i16,
    pub note: Option<String>,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserStatistics {
    pub id: i64,
    pub user_id: i64,
    pub total_quizzes: i32,
    pub total_mood_entries: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub wellness_points: i32,
    pub last_activity: DateTime<Utc>,
}

impl UserStatistics {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_quizzes: self.total_quizzes,
            total_mood_entries: self.total_mood_entries,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            wellness_points: self.wellness_points,
        }
    }
}

/// Earned badge. `achievement_type` is unique per user, so a badge can never
/// be awarded twice.
#[derive(Debug, Clone, FromRow)]
pub struct Achievement {
    pub id: i64,
    pub user_id: i64,
    pub achievement_type: String,
    pub achievement_name: String,
    pub description: String,
    pub icon: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub response: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommunityQuestion {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommunityReply {
    pub id: i64,
    pub question_id: i64,
    pub user_id: i64,
    pub content: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

/// A question joined with its author name and replies, as served by the
/// community listing. `username` is the raw author name; anonymity masking
/// happens at the HTTP layer.
#[derive(Debug, Clone)]
pub struct QuestionThread {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub reply_count: i64,
    pub replies: Vec<ThreadReply>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ThreadReply {
    pub id: i64,
    pub question_id: i64,
    pub user_id: i64,
    pub username: String,
    pub content: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

/// Non-critical telemetry row; writes that fail are dropped, never surfaced.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityRecord {
    pub id: i64,
    pub user_id: i64,
    pub activity_type: String,
    pub description: Option<String>,
    pub page_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ActivityFeedItem {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub activity_type: String,
    pub description: Option<String>,
    pub page_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
