use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::domain::achievements::{self, Badge};
use crate::domain::models::{
    Achievement, ActivityFeedItem, ActivityRecord, ChatMessage, MoodEntry, QuestionThread,
    QuizResponse, ThreadReply, User, UserStatistics,
};
use crate::domain::stats::{self, StatsSnapshot};
use crate::store::{
    MoodOutcome, NewActivity, NewMoodEntry, NewQuestion, NewQuizResponse, NewUser, QuizOutcome,
    StoreError, StoreResult, WellnessStore,
};

/// Postgres-backed store. Schema comes from the embedded migrations.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_db_err(err: sqlx::Error, entity: &'static str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(entity),
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::NotFound("User"),
        _ => StoreError::Database(err),
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, is_active, is_admin, \
                            last_login, created_at, updated_at";

/// Recomputes the statistics row from the user's stored rows, inside the
/// caller's transaction.
async fn refresh_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    today: NaiveDate,
) -> StoreResult<UserStatistics> {
    let total_quizzes: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM quiz_responses WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut **tx)
            .await?;
    let entry_days: Vec<NaiveDate> =
        sqlx::query_scalar("SELECT entry_date FROM mood_entries WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&mut **tx)
            .await?;
    let longest: Option<i32> =
        sqlx::query_scalar("SELECT longest_streak FROM user_statistics WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;

    let snap = stats::recompute(
        total_quizzes as i32,
        entry_days.len() as i32,
        &entry_days,
        longest.unwrap_or(0),
        today,
    );

    let row = sqlx::query_as::<_, UserStatistics>(
        r#"
        INSERT INTO user_statistics
            (user_id, total_quizzes, total_mood_entries, current_streak,
             longest_streak, wellness_points, last_activity)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        ON CONFLICT (user_id) DO UPDATE SET
            total_quizzes = EXCLUDED.total_quizzes,
            total_mood_entries = EXCLUDED.total_mood_entries,
            current_streak = EXCLUDED.current_streak,
            longest_streak = EXCLUDED.longest_streak,
            wellness_points = EXCLUDED.wellness_points,
            last_activity = NOW()
        RETURNING id, user_id, total_quizzes, total_mood_entries, current_streak,
                  longest_streak, wellness_points, last_activity
        "#,
    )
    .bind(user_id)
    .bind(snap.total_quizzes)
    .bind(snap.total_mood_entries)
    .bind(snap.current_streak)
    .bind(snap.longest_streak)
    .bind(snap.wellness_points)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_db_err(e, "statistics"))?;

    Ok(row)
}

/// Awards any badges the fresh snapshot unlocks. The unique constraint
/// makes the insert a no-op when a badge is already held, so only rows this
/// call actually created are reported back.
async fn award_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    snap: &StatsSnapshot,
) -> StoreResult<Vec<&'static Badge>> {
    let earned: Vec<String> =
        sqlx::query_scalar("SELECT achievement_type FROM user_achievements WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&mut **tx)
            .await?;

    let mut awarded = Vec::new();
    for badge in achievements::newly_unlocked(snap, &earned) {
        let inserted: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO user_achievements
                (user_id, achievement_type, achievement_name, description, icon)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, achievement_type) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(badge.kind)
        .bind(badge.name)
        .bind(badge.description)
        .bind(badge.icon)
        .fetch_optional(&mut **tx)
        .await?;
        if inserted.is_some() {
            awarded.push(badge);
        }
    }
    Ok(awarded)
}

#[derive(FromRow)]
struct QuestionRow {
    id: i64,
    user_id: i64,
    username: String,
    title: String,
    content: String,
    category: String,
    is_anonymous: bool,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl WellnessStore for PgStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, last_login) \
             VALUES ($1, $2, $3, NOW()) RETURNING {USER_COLUMNS}"
        ))
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_err(e, "Username or email"))?;

        sqlx::query("INSERT INTO user_statistics (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE LOWER(email) = LOWER($1) OR LOWER(username) = LOWER($1)"
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, user_id: i64) -> StoreResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn insert_session(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        sqlx::query("INSERT INTO user_sessions (user_id, token, expires_at) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(token)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "Session"))?;
        Ok(())
    }

    async fn record_login(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let touched = sqlx::query("UPDATE users SET last_login = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(StoreError::NotFound("User"));
        }

        sqlx::query("DELETE FROM user_sessions WHERE user_id = $1 AND expires_at < NOW()")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO user_sessions (user_id, token, expires_at) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(token)
            .bind(expires_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_err(e, "Session"))?;

        tx.commit().await?;
        Ok(())
    }

    async fn record_quiz_response(
        &self,
        user_id: i64,
        new: NewQuizResponse,
        today: NaiveDate,
    ) -> StoreResult<QuizOutcome> {
        let mut tx = self.pool.begin().await?;

        let response = sqlx::query_as::<_, QuizResponse>(
            r#"
            INSERT INTO quiz_responses (user_id, week_number, responses, score, mental_health_level)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, week_number, responses, score, mental_health_level, created_at
            "#,
        )
        .bind(user_id)
        .bind(new.week_number)
        .bind(serde_json::Value::from(new.responses))
        .bind(new.score)
        .bind(&new.level)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_err(e, "quiz response"))?;

        let stats = refresh_tx(&mut tx, user_id, today).await?;
        let new_badges = award_tx(&mut tx, user_id, &stats.snapshot()).await?;

        tx.commit().await?;
        Ok(QuizOutcome {
            response,
            stats,
            new_badges,
        })
    }

    async fn list_quiz_responses(&self, user_id: i64) -> StoreResult<Vec<QuizResponse>> {
        let rows = sqlx::query_as::<_, QuizResponse>(
            "SELECT id, user_id, week_number, responses, score, mental_health_level, created_at \
             FROM quiz_responses WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn record_mood_entry(
        &self,
        user_id: i64,
        new: NewMoodEntry,
        today: NaiveDate,
    ) -> StoreResult<MoodOutcome> {
        let mut tx = self.pool.begin().await?;

        let entry = sqlx::query_as::<_, MoodEntry>(
            r#"
            INSERT INTO mood_entries (user_id, mood, mood_value, note, entry_date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, entry_date) DO UPDATE SET
                mood = EXCLUDED.mood,
                mood_value = EXCLUDED.mood_value,
                note = EXCLUDED.note,
                created_at = NOW()
            RETURNING id, user_id, mood, mood_value, note, entry_date, created_at
            "#,
        )
        .bind(user_id)
        .bind(&new.mood)
        .bind(new.mood_value)
        .bind(&new.note)
        .bind(today)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_err(e, "mood entry"))?;

        let stats = refresh_tx(&mut tx, user_id, today).await?;
        let new_badges = award_tx(&mut tx, user_id, &stats.snapshot()).await?;

        tx.commit().await?;
        Ok(MoodOutcome {
            entry,
            stats,
            new_badges,
        })
    }

    async fn list_mood_entries(&self, user_id: i64) -> StoreResult<Vec<MoodEntry>> {
        let rows = sqlx::query_as::<_, MoodEntry>(
            "SELECT id, user_id, mood, mood_value, note, entry_date, created_at \
             FROM mood_entries WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn recent_mood_entries(&self, user_id: i64, limit: i64) -> StoreResult<Vec<MoodEntry>> {
        let rows = sqlx::query_as::<_, MoodEntry>(
            "SELECT id, user_id, mood, mood_value, note, entry_date, created_at \
             FROM mood_entries WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn refresh_statistics(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> StoreResult<UserStatistics> {
        let mut tx = self.pool.begin().await?;
        let stats = refresh_tx(&mut tx, user_id, today).await?;
        tx.commit().await?;
        Ok(stats)
    }

    async fn get_statistics(&self, user_id: i64) -> StoreResult<Option<UserStatistics>> {
        let row = sqlx::query_as::<_, UserStatistics>(
            "SELECT id, user_id, total_quizzes, total_mood_entries, current_streak, \
             longest_streak, wellness_points, last_activity \
             FROM user_statistics WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_achievements(&self, user_id: i64) -> StoreResult<Vec<Achievement>> {
        let rows = sqlx::query_as::<_, Achievement>(
            "SELECT id, user_id, achievement_type, achievement_name, description, icon, earned_at \
             FROM user_achievements WHERE user_id = $1 ORDER BY earned_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_chat_message(
        &self,
        user_id: i64,
        message: &str,
        response: &str,
        category: &str,
    ) -> StoreResult<ChatMessage> {
        let row = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_history (user_id, message, response, category)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, message, response, category, created_at
            "#,
        )
        .bind(user_id)
        .bind(message)
        .bind(response)
        .bind(category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "chat message"))?;
        Ok(row)
    }

    async fn list_chat_history(&self, user_id: i64, limit: i64) -> StoreResult<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, ChatMessage>(
            "SELECT id, user_id, message, response, category, created_at \
             FROM chat_history WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_question(&self, user_id: i64, new: NewQuestion) -> StoreResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO community_questions (user_id, title, content, category, is_anonymous)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&new.title)
        .bind(&new.content)
        .bind(&new.category)
        .bind(new.is_anonymous)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "Question"))?;
        Ok(id)
    }

    async fn list_questions(&self) -> StoreResult<Vec<QuestionThread>> {
        let questions = sqlx::query_as::<_, QuestionRow>(
            "SELECT cq.id, cq.user_id, u.username, cq.title, cq.content, cq.category, \
             cq.is_anonymous, cq.created_at \
             FROM community_questions cq JOIN users u ON u.id = cq.user_id \
             ORDER BY cq.created_at DESC, cq.id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let replies = sqlx::query_as::<_, ThreadReply>(
            "SELECT cr.id, cr.question_id, cr.user_id, u.username, cr.content, \
             cr.is_anonymous, cr.created_at \
             FROM community_replies cr JOIN users u ON u.id = cr.user_id \
             ORDER BY cr.created_at ASC, cr.id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_question: HashMap<i64, Vec<ThreadReply>> = HashMap::new();
        for reply in replies {
            by_question.entry(reply.question_id).or_default().push(reply);
        }

        Ok(questions
            .into_iter()
            .map(|q| {
                let replies = by_question.remove(&q.id).unwrap_or_default();
                QuestionThread {
                    id: q.id,
                    user_id: q.user_id,
                    username: q.username,
                    title: q.title,
                    content: q.content,
                    category: q.category,
                    is_anonymous: q.is_anonymous,
                    created_at: q.created_at,
                    reply_count: replies.len() as i64,
                    replies,
                }
            })
            .collect())
    }

    async fn add_reply(
        &self,
        question_id: i64,
        user_id: i64,
        content: &str,
        is_anonymous: bool,
    ) -> StoreResult<i64> {
        let exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM community_questions WHERE id = $1")
                .bind(question_id)
                .fetch_optional(&self.pool)
                .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound("Question"));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO community_replies (question_id, user_id, content, is_anonymous)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(question_id)
        .bind(user_id)
        .bind(content)
        .bind(is_anonymous)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "reply"))?;
        Ok(id)
    }

    async fn log_activity(&self, activity: NewActivity) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO user_activities (user_id, activity_type, description, page_url) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(activity.user_id)
        .bind(&activity.activity_type)
        .bind(&activity.description)
        .bind(&activity.page_url)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "activity"))?;
        Ok(())
    }

    async fn list_user_activities(
        &self,
        user_id: i64,
        limit: i64,
    ) -> StoreResult<Vec<ActivityRecord>> {
        let rows = sqlx::query_as::<_, ActivityRecord>(
            "SELECT id, user_id, activity_type, description, page_url, created_at \
             FROM user_activities WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_recent_activities(&self, limit: i64) -> StoreResult<Vec<ActivityFeedItem>> {
        let rows = sqlx::query_as::<_, ActivityFeedItem>(
            "SELECT ua.id, ua.user_id, u.username, ua.activity_type, ua.description, \
             ua.page_url, ua.created_at \
             FROM user_activities ua JOIN users u ON u.id = ua.user_id \
             ORDER BY ua.created_at DESC, ua.id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
