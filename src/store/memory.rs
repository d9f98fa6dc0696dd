use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::domain::achievements::{self, Badge};
use crate::domain::models::{
    Achievement, ActivityFeedItem, ActivityRecord, ChatMessage, CommunityQuestion, CommunityReply,
    MoodEntry, QuestionThread, QuizResponse, ThreadReply, User, UserStatistics,
};
use crate::domain::stats::{self, StatsSnapshot};
use crate::store::{
    MoodOutcome, NewActivity, NewMoodEntry, NewQuestion, NewQuizResponse, NewUser, QuizOutcome,
    StoreError, StoreResult, WellnessStore,
};

/// Keeps everything in plain vectors behind one RwLock. Used by the test
/// suite and by deployments without a database.
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

struct StoredSession {
    user_id: i64,
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryInner {
    users: Vec<User>,
    sessions: Vec<StoredSession>,
    quiz_responses: Vec<QuizResponse>,
    mood_entries: Vec<MoodEntry>,
    statistics: HashMap<i64, UserStatistics>,
    achievements: Vec<Achievement>,
    questions: Vec<CommunityQuestion>,
    replies: Vec<CommunityReply>,
    chat_messages: Vec<ChatMessage>,
    activities: Vec<ActivityRecord>,
    next_id: i64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryInner::default()),
        }
    }
}

impl MemoryInner {
    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn require_user(&self, user_id: i64) -> StoreResult<()> {
        if self.users.iter().any(|u| u.id == user_id) {
            Ok(())
        } else {
            Err(StoreError::NotFound("User"))
        }
    }

    fn username_of(&self, user_id: i64) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    fn push_session(
        &mut self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        if self.sessions.iter().any(|s| s.token == token) {
            return Err(StoreError::Duplicate("Session"));
        }
        self.sessions.push(StoredSession {
            user_id,
            token: token.to_string(),
            expires_at,
        });
        Ok(())
    }

    fn refresh_stats_locked(
        &mut self,
        user_id: i64,
        today: NaiveDate,
    ) -> StoreResult<UserStatistics> {
        self.require_user(user_id)?;

        let total_quizzes = self
            .quiz_responses
            .iter()
            .filter(|q| q.user_id == user_id)
            .count() as i32;
        let entry_days: Vec<NaiveDate> = self
            .mood_entries
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.entry_date)
            .collect();
        let longest = self
            .statistics
            .get(&user_id)
            .map(|s| s.longest_streak)
            .unwrap_or(0);

        let snap = stats::recompute(
            total_quizzes,
            entry_days.len() as i32,
            &entry_days,
            longest,
            today,
        );

        let id = match self.statistics.get(&user_id) {
            Some(existing) => existing.id,
            None => self.alloc_id(),
        };
        let row = UserStatistics {
            id,
            user_id,
            total_quizzes: snap.total_quizzes,
            total_mood_entries: snap.total_mood_entries,
            current_streak: snap.current_streak,
            longest_streak: snap.longest_streak,
            wellness_points: snap.wellness_points,
            last_activity: Utc::now(),
        };
        self.statistics.insert(user_id, row.clone());
        Ok(row)
    }

    fn award_badges_locked(&mut self, user_id: i64, snap: &StatsSnapshot) -> Vec<&'static Badge> {
        let earned: Vec<String> = self
            .achievements
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.achievement_type.clone())
            .collect();
        let unlocked = achievements::newly_unlocked(snap, &earned);
        for badge in &unlocked {
            let id = self.alloc_id();
            self.achievements.push(Achievement {
                id,
                user_id,
                achievement_type: badge.kind.to_string(),
                achievement_name: badge.name.to_string(),
                description: badge.description.to_string(),
                icon: badge.icon.to_string(),
                earned_at: Utc::now(),
            });
        }
        unlocked
    }
}

#[async_trait]
impl WellnessStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;

        let username_lower = new.username.to_lowercase();
        let email_lower = new.email.to_lowercase();
        let taken = inner.users.iter().any(|u| {
            u.username.to_lowercase() == username_lower || u.email.to_lowercase() == email_lower
        });
        if taken {
            return Err(StoreError::Duplicate("Username or email"));
        }

        let now = Utc::now();
        let id = inner.alloc_id();
        let user = User {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            is_active: true,
            is_admin: false,
            last_login: Some(now),
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());

        let stats_id = inner.alloc_id();
        inner.statistics.insert(
            id,
            UserStatistics {
                id: stats_id,
                user_id: id,
                total_quizzes: 0,
                total_mood_entries: 0,
                current_streak: 0,
                longest_streak: 0,
                wellness_points: 0,
                last_activity: now,
            },
        );

        Ok(user)
    }

    async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        let login_lower = login.to_lowercase();
        Ok(inner
            .users
            .iter()
            .find(|u| {
                u.email.to_lowercase() == login_lower || u.username.to_lowercase() == login_lower
            })
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: i64) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn insert_session(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.require_user(user_id)?;
        inner.push_session(user_id, token, expires_at)
    }

    async fn record_login(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::NotFound("User"))?;
        user.last_login = Some(now);
        user.updated_at = now;

        inner
            .sessions
            .retain(|s| s.user_id != user_id || s.expires_at >= now);
        inner.push_session(user_id, token, expires_at)
    }

    async fn record_quiz_response(
        &self,
        user_id: i64,
        new: NewQuizResponse,
        today: NaiveDate,
    ) -> StoreResult<QuizOutcome> {
        let mut inner = self.inner.write().await;
        inner.require_user(user_id)?;

        let id = inner.alloc_id();
        let response = QuizResponse {
            id,
            user_id,
            week_number: new.week_number,
            responses: serde_json::Value::from(new.responses),
            score: new.score,
            mental_health_level: new.level,
            created_at: Utc::now(),
        };
        inner.quiz_responses.push(response.clone());

        let stats = inner.refresh_stats_locked(user_id, today)?;
        let new_badges = inner.award_badges_locked(user_id, &stats.snapshot());

        Ok(QuizOutcome {
            response,
            stats,
            new_badges,
        })
    }

    async fn list_quiz_responses(&self, user_id: i64) -> StoreResult<Vec<QuizResponse>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<QuizResponse> = inner
            .quiz_responses
            .iter()
            .filter(|q| q.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn record_mood_entry(
        &self,
        user_id: i64,
        new: NewMoodEntry,
        today: NaiveDate,
    ) -> StoreResult<MoodOutcome> {
        let mut inner = self.inner.write().await;
        inner.require_user(user_id)?;
        let now = Utc::now();

        let existing = inner
            .mood_entries
            .iter()
            .position(|m| m.user_id == user_id && m.entry_date == today);
        let entry = match existing {
            Some(idx) => {
                let slot = &mut inner.mood_entries[idx];
                slot.mood = new.mood;
                slot.mood_value = new.mood_value;
                slot.note = new.note;
                slot.created_at = now;
                slot.clone()
            }
            None => {
                let id = inner.alloc_id();
                let entry = MoodEntry {
                    id,
                    user_id,
                    mood: new.mood,
                    mood_value: new.mood_value,
                    note: new.note,
                    entry_date: today,
                    created_at: now,
                };
                inner.mood_entries.push(entry.clone());
                entry
            }
        };

        let stats = inner.refresh_stats_locked(user_id, today)?;
        let new_badges = inner.award_badges_locked(user_id, &stats.snapshot());

        Ok(MoodOutcome {
            entry,
            stats,
            new_badges,
        })
    }

    async fn list_mood_entries(&self, user_id: i64) -> StoreResult<Vec<MoodEntry>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<MoodEntry> = inner
            .mood_entries
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(rows)
    }

    async fn recent_mood_entries(&self, user_id: i64, limit: i64) -> StoreResult<Vec<MoodEntry>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<MoodEntry> = inner
            .mood_entries
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn refresh_statistics(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> StoreResult<UserStatistics> {
        let mut inner = self.inner.write().await;
        inner.refresh_stats_locked(user_id, today)
    }

    async fn get_statistics(&self, user_id: i64) -> StoreResult<Option<UserStatistics>> {
        let inner = self.inner.read().await;
        Ok(inner.statistics.get(&user_id).cloned())
    }

    async fn list_achievements(&self, user_id: i64) -> StoreResult<Vec<Achievement>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<Achievement> = inner
            .achievements
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.id);
        Ok(rows)
    }

    async fn insert_chat_message(
        &self,
        user_id: i64,
        message: &str,
        response: &str,
        category: &str,
    ) -> StoreResult<ChatMessage> {
        let mut inner = self.inner.write().await;
        inner.require_user(user_id)?;
        let id = inner.alloc_id();
        let row = ChatMessage {
            id,
            user_id,
            message: message.to_string(),
            response: response.to_string(),
            category: category.to_string(),
            created_at: Utc::now(),
        };
        inner.chat_messages.push(row.clone());
        Ok(row)
    }

    async fn list_chat_history(&self, user_id: i64, limit: i64) -> StoreResult<Vec<ChatMessage>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<ChatMessage> = inner
            .chat_messages
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn create_question(&self, user_id: i64, new: NewQuestion) -> StoreResult<i64> {
        let mut inner = self.inner.write().await;
        inner.require_user(user_id)?;
        let id = inner.alloc_id();
        inner.questions.push(CommunityQuestion {
            id,
            user_id,
            title: new.title,
            content: new.content,
            category: new.category,
            is_anonymous: new.is_anonymous,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_questions(&self) -> StoreResult<Vec<QuestionThread>> {
        let inner = self.inner.read().await;
        let mut threads: Vec<QuestionThread> = inner
            .questions
            .iter()
            .map(|q| {
                let mut replies: Vec<ThreadReply> = inner
                    .replies
                    .iter()
                    .filter(|r| r.question_id == q.id)
                    .map(|r| ThreadReply {
                        id: r.id,
                        question_id: r.question_id,
                        user_id: r.user_id,
                        username: inner.username_of(r.user_id),
                        content: r.content.clone(),
                        is_anonymous: r.is_anonymous,
                        created_at: r.created_at,
                    })
                    .collect();
                replies.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
                QuestionThread {
                    id: q.id,
                    user_id: q.user_id,
                    username: inner.username_of(q.user_id),
                    title: q.title.clone(),
                    content: q.content.clone(),
                    category: q.category.clone(),
                    is_anonymous: q.is_anonymous,
                    created_at: q.created_at,
                    reply_count: replies.len() as i64,
                    replies,
                }
            })
            .collect();
        threads.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(threads)
    }

    async fn add_reply(
        &self,
        question_id: i64,
        user_id: i64,
        content: &str,
        is_anonymous: bool,
    ) -> StoreResult<i64> {
        let mut inner = self.inner.write().await;
        if !inner.questions.iter().any(|q| q.id == question_id) {
            return Err(StoreError::NotFound("Question"));
        }
        inner.require_user(user_id)?;
        let id = inner.alloc_id();
        inner.replies.push(CommunityReply {
            id,
            question_id,
            user_id,
            content: content.to_string(),
            is_anonymous,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn log_activity(&self, activity: NewActivity) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.require_user(activity.user_id)?;
        let id = inner.alloc_id();
        inner.activities.push(ActivityRecord {
            id,
            user_id: activity.user_id,
            activity_type: activity.activity_type,
            description: activity.description,
            page_url: activity.page_url,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_user_activities(
        &self,
        user_id: i64,
        limit: i64,
    ) -> StoreResult<Vec<ActivityRecord>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<ActivityRecord> = inner
            .activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn list_recent_activities(&self, limit: i64) -> StoreResult<Vec<ActivityFeedItem>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<ActivityFeedItem> = inner
            .activities
            .iter()
            .map(|a| ActivityFeedItem {
                id: a.id,
                user_id: a.user_id,
                username: inner.username_of(a.user_id),
                activity_type: a.activity_type.clone(),
                description: a.description.clone(),
                page_url: a.page_url.clone(),
                created_at: a.created_at,
            })
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}
