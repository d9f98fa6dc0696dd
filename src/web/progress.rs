use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::models::QuizResponse;
use crate::error::ApiResult;
use crate::state::SharedState;
use crate::web::session::{ensure_owner, AuthedUser};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub week: i64,
    pub score: i32,
    pub level: String,
    pub date: DateTime<Utc>,
    pub responses: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSummary {
    pub level: String,
    pub avg_score: f64,
    pub total_assessments: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub score: i32,
    pub level: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub summary: Vec<LevelSummary>,
    pub recent_trend: Vec<TrendPoint>,
    pub total_assessments: usize,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/:user_id", get(history))
        .route("/analytics/:user_id", get(analytics))
        .with_state(state)
}

async fn history(
    AuthedUser(user): AuthedUser,
    State(state): State<SharedState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Vec<ProgressEntry>> {
    ensure_owner(&user, user_id)?;

    let responses = state.store.list_quiz_responses(user_id).await?;
    Ok(Json(
        responses
            .into_iter()
            .map(|r| ProgressEntry {
                week: r.week_number,
                score: r.score,
                level: r.mental_health_level,
                date: r.created_at,
                responses: r.responses,
            })
            .collect(),
    ))
}

/// Aggregated in the handler from the plain response list, so both storage
/// backings share one code path.
fn summarize(responses: &[QuizResponse]) -> Vec<LevelSummary> {
    let mut by_level: BTreeMap<&str, (i64, usize)> = BTreeMap::new();
    for r in responses {
        let slot = by_level.entry(r.mental_health_level.as_str()).or_default();
        slot.0 += i64::from(r.score);
        slot.1 += 1;
    }
    by_level
        .into_iter()
        .map(|(level, (score_sum, count))| LevelSummary {
            level: level.to_string(),
            avg_score: score_sum as f64 / count as f64,
            total_assessments: count,
        })
        .collect()
}

async fn analytics(
    AuthedUser(user): AuthedUser,
    State(state): State<SharedState>,
    Path(user_id): Path<i64>,
) -> ApiResult<AnalyticsResponse> {
    ensure_owner(&user, user_id)?;

    // Newest first.
    let responses = state.store.list_quiz_responses(user_id).await?;

    let recent_trend = responses
        .iter()
        .take(5)
        .map(|r| TrendPoint {
            score: r.score,
            level: r.mental_health_level.clone(),
            date: r.created_at,
        })
        .collect();

    Ok(Json(AnalyticsResponse {
        summary: summarize(&responses),
        recent_trend,
        total_assessments: responses.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(score: i32, level: &str) -> QuizResponse {
        QuizResponse {
            id: 0,
            user_id: 1,
            week_number: 1,
            responses: serde_json::json!([score]),
            score,
            mental_health_level: level.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_groups_by_level() {
        let rows = vec![
            response(10, "Fair"),
            response(14, "Fair"),
            response(20, "Excellent"),
        ];
        let summary = summarize(&rows);
        assert_eq!(summary.len(), 2);

        let fair = summary.iter().find(|s| s.level == "Fair").unwrap();
        assert_eq!(fair.total_assessments, 2);
        assert!((fair.avg_score - 12.0).abs() < f64::EPSILON);

        let excellent = summary.iter().find(|s| s.level == "Excellent").unwrap();
        assert_eq!(excellent.total_assessments, 1);
    }

    #[test]
    fn test_summary_of_nothing_is_empty() {
        assert!(summarize(&[]).is_empty());
    }
}
