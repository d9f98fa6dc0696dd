use chrono::Utc;
use serde::Serialize;

use crate::domain::models::User;
use crate::domain::scoring::{WellnessLevel, CRISIS_RESOURCES, DEFAULT_RECOMMENDATION};
use crate::store::{StoreResult, WellnessStore};

const RECENT_MOOD_LIMIT: i64 = 7;

/// Everything the email collaborator needs to render one wellness report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub username: String,
    pub email: String,
    pub latest_score: Option<i32>,
    pub latest_level: String,
    pub average_score: f64,
    pub total_assessments: i32,
    pub total_mood_entries: i32,
    pub current_streak: i32,
    pub wellness_points: i32,
    pub badges: Vec<String>,
    pub recent_moods: Vec<String>,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crisis_resources: Option<[&'static str; 2]>,
}

/// Collects the latest assessment, statistics, badges and recent moods into
/// one payload. Delivery is the collaborator's problem; this ends at the
/// payload.
pub async fn build_report(store: &dyn WellnessStore, user: &User) -> StoreResult<ReportPayload> {
    let responses = store.list_quiz_responses(user.id).await?;
    let stats = store.get_statistics(user.id).await?;
    let achievements = store.list_achievements(user.id).await?;
    let moods = store.recent_mood_entries(user.id, RECENT_MOOD_LIMIT).await?;

    let latest = responses.first();
    let (latest_score, latest_level, recommendation, crisis_resources) = match latest {
        Some(r) => {
            let level = WellnessLevel::from_score(r.score);
            (
                Some(r.score),
                r.mental_health_level.clone(),
                level.recommendation().to_string(),
                level.is_crisis().then_some(CRISIS_RESOURCES),
            )
        }
        None => (
            None,
            "Not assessed".to_string(),
            DEFAULT_RECOMMENDATION.to_string(),
            None,
        ),
    };

    let average_score = if responses.is_empty() {
        0.0
    } else {
        responses.iter().map(|r| i64::from(r.score)).sum::<i64>() as f64 / responses.len() as f64
    };

    let (total_mood_entries, current_streak, wellness_points) = stats
        .map(|s| (s.total_mood_entries, s.current_streak, s.wellness_points))
        .unwrap_or_default();

    Ok(ReportPayload {
        username: user.username.clone(),
        email: user.email.clone(),
        latest_score,
        latest_level,
        average_score,
        total_assessments: responses.len() as i32,
        total_mood_entries,
        current_streak,
        wellness_points,
        badges: achievements
            .into_iter()
            .map(|a| format!("{} {}", a.icon, a.achievement_name))
            .collect(),
        recent_moods: moods
            .into_iter()
            .map(|m| format!("{} ({})", m.mood, m.entry_date))
            .collect(),
        recommendation,
        crisis_resources,
    })
}

/// Generated-at stamp for the report body, kept here so the payload itself
/// stays a pure function of stored rows.
pub fn generated_at() -> String {
    Utc::now().format("%Y-%m-%d %H:%M UTC").to_string()
}
