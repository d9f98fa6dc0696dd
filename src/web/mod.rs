pub mod activity;
pub mod auth;
pub mod chat;
pub mod community;
pub mod gamification;
pub mod mood;
pub mod progress;
pub mod quiz;
pub mod reports;
pub mod session;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::SharedState;

async fn health() -> &'static str {
    "OK"
}

async fn root() -> Json<Value> {
    Json(json!({
        "status": "MindCare API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/auth", auth::router(state.clone()))
        .nest("/quiz", quiz::router(state.clone()))
        .nest("/mood", mood::router(state.clone()))
        .nest("/gamification", gamification::router(state.clone()))
        .nest("/progress", progress::router(state.clone()))
        .nest("/chatbot", chat::router(state.clone()))
        .nest("/community", community::router(state.clone()))
        .nest("/reports", reports::router(state.clone()))
        .nest("/activity", activity::router(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::RateLimiter;
    use crate::state::AppState;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = Arc::new(AppState {
            store: Arc::new(MemoryStore::new()),
            session_key: b"test-session-key".to_vec(),
            login_limiter: RateLimiter::new(100, 60),
        });
        routes(state)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register(app: &Router, username: &str, email: &str) -> (String, i64) {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/register",
                None,
                json!({"username": username, "email": email, "password": "secret123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_i64().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_health_and_root() {
        let app = app();
        let response = app.clone().oneshot(get_request("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get_request("/", None)).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_register_rejects_blank_fields() {
        let app = app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/auth/register",
                None,
                json!({"username": "  ", "email": "a@b.c", "password": "pw"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "All fields are required");
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_a_400() {
        let app = app();
        register(&app, "dana", "dana@example.com").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/auth/register",
                None,
                json!({"username": "other", "email": "DANA@example.com", "password": "pw"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Username or email already exists");
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let app = app();
        register(&app, "lee", "lee@example.com").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/login",
                None,
                json!({"email": "lee@example.com", "password": "secret123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["token"].as_str().unwrap().len() > 16);
        assert_eq!(body["user"]["username"], "lee");
        assert_eq!(body["stats"]["wellnessPoints"], 0);

        let response = app
            .oneshot(json_request(
                "POST",
                "/auth/login",
                None,
                json!({"email": "lee@example.com", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_question_bank_is_public() {
        let app = app();
        let response = app.oneshot(get_request("/quiz/questions", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let questions = body.as_array().unwrap();
        assert_eq!(questions.len(), 10);
        assert_eq!(questions[0]["options"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_quiz_submission_requires_a_session() {
        let app = app();
        let response = app
            .oneshot(json_request(
                "POST",
                "/quiz/submit",
                None,
                json!({"userId": 1, "responses": [0], "weekNumber": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_all_zero_quiz_scores_severe_and_awards_first_steps() {
        let app = app();
        let (token, user_id) = register(&app, "quinn", "quinn@example.com").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/quiz/submit",
                Some(&token),
                json!({"userId": user_id, "responses": [0,0,0,0,0,0,0,0,0,0], "weekNumber": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["score"], 0);
        assert_eq!(body["level"], "Severe - Seek Help");
        assert_eq!(body["message"], "Assessment complete. Score: 0/30");
        assert_eq!(body["userStats"]["totalQuizzes"], 1);
        assert_eq!(body["userStats"]["wellnessPoints"], 10);
        assert_eq!(body["userStats"]["badges"][0]["name"], "First Steps");
        assert_eq!(body["newBadges"][0]["name"], "First Steps");
        assert_eq!(
            body["crisisResources"][0],
            "National Suicide Prevention Lifeline: 988"
        );
        assert_eq!(
            body["crisisResources"][1],
            "Crisis Text Line: Text HOME to 741741"
        );
    }

    #[tokio::test]
    async fn test_high_score_has_no_crisis_block() {
        let app = app();
        let (token, user_id) = register(&app, "vic", "vic@example.com").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/quiz/submit",
                Some(&token),
                json!({"userId": user_id, "responses": [3,3,3,3,3,3,3], "weekNumber": 2}),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["score"], 21);
        assert_eq!(body["level"], "Excellent");
        assert!(body.get("crisisResources").is_none());
    }

    #[tokio::test]
    async fn test_repeat_submissions_keep_earlier_badges_in_stats() {
        let app = app();
        let (token, user_id) = register(&app, "fin", "fin@example.com").await;

        let mut body = Value::Null;
        for _ in 0..5 {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/quiz/submit",
                    Some(&token),
                    json!({"userId": user_id, "responses": [2,2,2], "weekNumber": 1}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            body = body_json(response).await;
        }

        // The stats block carries everything earned so far, while newBadges
        // is only what the fifth submission added.
        let earned: Vec<&str> = body["userStats"]["badges"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["name"].as_str().unwrap())
            .collect();
        assert_eq!(earned, vec!["First Steps", "Consistent Tracker"]);

        let fresh: Vec<&str> = body["newBadges"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["name"].as_str().unwrap())
            .collect();
        assert_eq!(fresh, vec!["Consistent Tracker"]);
    }

    #[tokio::test]
    async fn test_out_of_range_answers_are_rejected() {
        let app = app();
        let (token, user_id) = register(&app, "rae", "rae@example.com").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/quiz/submit",
                Some(&token),
                json!({"userId": user_id, "responses": [0, 4], "weekNumber": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_session_must_match_the_target_user() {
        let app = app();
        let (token, _) = register(&app, "sam", "sam@example.com").await;
        let (_, other_id) = register(&app, "noa", "noa@example.com").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/mood/save",
                Some(&token),
                json!({"userId": other_id, "mood": "Happy"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_mood_save_upserts_within_the_day() {
        let app = app();
        let (token, user_id) = register(&app, "mira", "mira@example.com").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/mood/save",
                Some(&token),
                json!({"userId": user_id, "mood": "Sad", "note": "rough morning"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let first = body_json(response).await;
        assert_eq!(first["message"], "Mood saved successfully");

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/mood/save",
                Some(&token),
                json!({"userId": user_id, "mood": "Happy"}),
            ))
            .await
            .unwrap();
        let second = body_json(response).await;
        assert_eq!(first["id"], second["id"]);

        let response = app
            .oneshot(get_request(&format!("/mood/{user_id}"), Some(&token)))
            .await
            .unwrap();
        let entries = body_json(response).await;
        let entries = entries.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["mood"], "Happy");
        assert_eq!(entries[0]["moodValue"], 5);
    }

    #[tokio::test]
    async fn test_gamification_summary_after_activity() {
        let app = app();
        let (token, user_id) = register(&app, "tess", "tess@example.com").await;

        app.clone()
            .oneshot(json_request(
                "POST",
                "/quiz/submit",
                Some(&token),
                json!({"userId": user_id, "responses": [1,1,1,1,1], "weekNumber": 1}),
            ))
            .await
            .unwrap();
        app.clone()
            .oneshot(json_request(
                "POST",
                "/mood/save",
                Some(&token),
                json!({"userId": user_id, "mood": "Calm"}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(get_request(&format!("/gamification/{user_id}"), Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["totalQuizzes"], 1);
        assert_eq!(body["totalMoodEntries"], 1);
        assert_eq!(body["currentStreak"], 1);
        assert_eq!(body["points"], 15);
        assert!(body.get("longestStreak").is_none());
        let badge_names: Vec<&str> = body["badges"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["name"].as_str().unwrap())
            .collect();
        assert!(badge_names.contains(&"First Steps"));
    }

    #[tokio::test]
    async fn test_progress_history_and_analytics() {
        let app = app();
        let (token, user_id) = register(&app, "pat", "pat@example.com").await;

        for responses in [json!([0, 0]), json!([3, 3, 3, 3])] {
            app.clone()
                .oneshot(json_request(
                    "POST",
                    "/quiz/submit",
                    Some(&token),
                    json!({"userId": user_id, "responses": responses, "weekNumber": 7}),
                ))
                .await
                .unwrap();
        }

        let response = app
            .clone()
            .oneshot(get_request(&format!("/progress/{user_id}"), Some(&token)))
            .await
            .unwrap();
        let history = body_json(response).await;
        let history = history.as_array().unwrap().clone();
        assert_eq!(history.len(), 2);
        // Newest first.
        assert_eq!(history[0]["score"], 12);
        assert_eq!(history[1]["score"], 0);
        assert_eq!(history[0]["week"], 7);

        let response = app
            .oneshot(get_request(
                &format!("/progress/analytics/{user_id}"),
                Some(&token),
            ))
            .await
            .unwrap();
        let analytics = body_json(response).await;
        assert_eq!(analytics["totalAssessments"], 2);
        assert_eq!(analytics["recentTrend"].as_array().unwrap().len(), 2);
        assert_eq!(analytics["recentTrend"][0]["score"], 12);
    }

    #[tokio::test]
    async fn test_chatbot_replies_and_keeps_history() {
        let app = app();
        let (token, user_id) = register(&app, "kit", "kit@example.com").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/chatbot/chat",
                Some(&token),
                json!({"userId": user_id, "message": "I can't sleep at night"}),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert!(body["response"]
            .as_str()
            .unwrap()
            .starts_with("Establish a bedtime routine"));

        let response = app
            .oneshot(get_request(&format!("/chatbot/history/{user_id}"), Some(&token)))
            .await
            .unwrap();
        let history = body_json(response).await;
        let history = history.as_array().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["category"], "sleep");
    }

    #[tokio::test]
    async fn test_community_masks_anonymous_authors() {
        let app = app();
        let (token, user_id) = register(&app, "ash", "ash@example.com").await;
        let (reply_token, replier_id) = register(&app, "bo", "bo@example.com").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/community/questions",
                Some(&token),
                json!({
                    "userId": user_id,
                    "title": "Trouble sleeping",
                    "content": "Any advice?",
                    "isAnonymous": true
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let posted = body_json(response).await;
        let question_id = posted["questionId"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/community/questions/{question_id}/reply"),
                Some(&reply_token),
                json!({"userId": replier_id, "content": "Try a routine"}),
            ))
            .await
            .unwrap();
        let reply = body_json(response).await;
        assert_eq!(reply["message"], "Reply added successfully");

        let response = app
            .clone()
            .oneshot(get_request("/community/questions", None))
            .await
            .unwrap();
        let threads = body_json(response).await;
        let thread = &threads.as_array().unwrap()[0];
        assert_eq!(thread["username"], "Anonymous");
        assert_eq!(thread["replyCount"], 1);
        assert_eq!(thread["replies"][0]["username"], "bo");

        // Replying to a question that does not exist is a 404.
        let response = app
            .oneshot(json_request(
                "POST",
                "/community/questions/999999/reply",
                Some(&reply_token),
                json!({"userId": replier_id, "content": "hello?"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_report_includes_crisis_lines_for_low_scores() {
        let app = app();
        let (token, user_id) = register(&app, "ira", "ira@example.com").await;

        app.clone()
            .oneshot(json_request(
                "POST",
                "/quiz/submit",
                Some(&token),
                json!({"userId": user_id, "responses": [0,0,1], "weekNumber": 1}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/reports/send/{user_id}"),
                Some(&token),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Report sent successfully");
        let report = &body["reportData"];
        assert_eq!(report["latestScore"], 1);
        assert_eq!(report["latestLevel"], "Severe - Seek Help");
        assert_eq!(
            report["crisisResources"][0],
            "National Suicide Prevention Lifeline: 988"
        );
        assert_eq!(
            report["crisisResources"][1],
            "Crisis Text Line: Text HOME to 741741"
        );
    }

    #[tokio::test]
    async fn test_activity_feed_is_admin_only() {
        let app = app();
        let (token, user_id) = register(&app, "gil", "gil@example.com").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/activity/log",
                Some(&token),
                json!({"userId": user_id, "activityType": "page_view", "pageUrl": "/dashboard"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get_request(&format!("/activity/user/{user_id}"), Some(&token)))
            .await
            .unwrap();
        let feed = body_json(response).await;
        assert_eq!(feed.as_array().unwrap().len(), 1);

        let response = app
            .oneshot(get_request("/activity/all", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_login_rate_limit() {
        let state = Arc::new(AppState {
            store: Arc::new(MemoryStore::new()),
            session_key: b"test-session-key".to_vec(),
            login_limiter: RateLimiter::new(2, 60),
        });
        let app = routes(state);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/auth/login",
                    None,
                    json!({"email": "ghost@example.com", "password": "nope"}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        let response = app
            .oneshot(json_request(
                "POST",
                "/auth/login",
                None,
                json!({"email": "ghost@example.com", "password": "nope"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
