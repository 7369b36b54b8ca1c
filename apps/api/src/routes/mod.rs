pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::accounts::handlers as accounts;
use crate::admin::handlers as admin;
use crate::applications::handlers as applications;
use crate::state::AppState;

/// Résumé uploads above this size are rejected.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(accounts::handle_index))
        .route("/register", post(accounts::handle_register))
        .route("/login", post(accounts::handle_login))
        .route("/logout", post(accounts::handle_logout))
        // Candidate flow
        .route(
            "/apply",
            post(applications::handle_apply).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/quiz",
            get(applications::handle_get_quiz).post(applications::handle_submit_quiz),
        )
        .route("/user_dashboard", get(applications::handle_user_dashboard))
        // Admin
        .route("/dashboard", get(admin::handle_dashboard))
        .route("/admin/job/add", post(admin::handle_add_job))
        .route("/compare", post(admin::handle_compare))
        .nest_service("/static", static_dir)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::accounts::store::seed_admin;
    use crate::config::Config;
    use crate::db::test_pool;
    use crate::llm_client::LlmClient;
    use crate::screening::quiz::fallback_questions;
    use crate::session::SessionStore;

    async fn test_state(static_dir: &std::path::Path) -> AppState {
        let db = test_pool().await;
        seed_admin(&db, "admin", "admin").await.unwrap();
        let config = Config {
            database_url: "sqlite::memory:".into(),
            port: 0,
            rust_log: "info".into(),
            llm_url: "http://127.0.0.1:9/api/generate".into(),
            llm_model: "test".into(),
            llm_timeout_secs: 1,
            model_path: "missing-model.json".into(),
            upload_dir: static_dir.join("uploads"),
            static_dir: static_dir.to_path_buf(),
            admin_username: "admin".into(),
            admin_password: "admin".into(),
            session_ttl_secs: 3600,
        };
        AppState {
            db,
            llm: LlmClient::new(config.llm_url.clone(), config.llm_model.clone(), Duration::from_secs(1))
                .unwrap(),
            config: Arc::new(config),
            decision_model: None,
            sessions: SessionStore::new(Duration::from_secs(3600)),
        }
    }

    fn json_request(method: &str, uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn session_cookie_of(response: &axum::response::Response) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(app: &Router, username: &str, password: &str) -> String {
        let body = format!(r#"{{"username": "{username}", "password": "{password}"}}"#);
        let response = app
            .clone()
            .oneshot(json_request("POST", "/login", &body, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie_of(&response)
    }

    const BOUNDARY: &str = "X-RECRUITER-BOUNDARY";

    /// `(field, filename, content)` parts as a multipart/form-data request.
    fn multipart_request(uri: &str, cookie: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: text/plain\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::COOKIE, cookie)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).await);
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_register_twice_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).await);
        let body = r#"{"username": "ada", "password": "pw"}"#;

        let first = app.clone().oneshot(json_request("POST", "/register", body, None)).await.unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        let second = app.oneshot(json_request("POST", "/register", body, None)).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_bad_login_is_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).await);
        let response = app
            .oneshot(json_request(
                "POST",
                "/login",
                r#"{"username": "admin", "password": "nope"}"#,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_role_separation() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).await);

        let anonymous = app
            .clone()
            .oneshot(Request::get("/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let login = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/login",
                r#"{"username": "admin", "password": "admin"}"#,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::OK);
        let cookie = session_cookie_of(&login);

        let candidate_only = app
            .clone()
            .oneshot(json_request("GET", "/user_dashboard", "", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(candidate_only.status(), StatusCode::FORBIDDEN);

        let dashboard = app
            .oneshot(json_request("GET", "/dashboard", "", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(dashboard.status(), StatusCode::OK);
        let body = body_json(dashboard).await;
        assert!(body["candidates"].as_array().unwrap().is_empty());
        assert!(body["charts"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_posts_job_with_default_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).await);
        let login = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/login",
                r#"{"username": "admin", "password": "admin"}"#,
                None,
            ))
            .await
            .unwrap();
        let cookie = session_cookie_of(&login);

        let response = app
            .oneshot(json_request(
                "POST",
                "/admin/job/add",
                r#"{"title": "Backend", "description": "Rust services", "skills_required": "rust, sql"}"#,
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let job = body_json(response).await;
        assert_eq!(job["min_quiz_score"], 10.0);
        assert_eq!(job["min_resume_score"], 75.0);
    }

    #[tokio::test]
    async fn test_quiz_without_application_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).await);
        app.clone()
            .oneshot(json_request(
                "POST",
                "/register",
                r#"{"username": "ada", "password": "pw"}"#,
                None,
            ))
            .await
            .unwrap();
        let login = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/login",
                r#"{"username": "ada", "password": "pw"}"#,
                None,
            ))
            .await
            .unwrap();
        let cookie = session_cookie_of(&login);

        let response = app
            .oneshot(json_request("POST", "/quiz", r#"{"answers": []}"#, Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_apply_quiz_dashboard_flow() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()).await);

        let admin = login(&app, "admin", "admin").await;
        let job = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/job/add",
                r#"{"title": "Backend", "description": "Python services", "skills_required": "python, sql, docker", "min_quiz_score": 10, "min_resume_score": 40}"#,
                Some(&admin),
            ))
            .await
            .unwrap();
        assert_eq!(job.status(), StatusCode::CREATED);

        app.clone()
            .oneshot(json_request(
                "POST",
                "/register",
                r#"{"username": "ada", "password": "pw"}"#,
                None,
            ))
            .await
            .unwrap();
        let ada = login(&app, "ada", "pw").await;

        // The model server is unreachable, so every model-backed step falls back.
        let apply = app
            .clone()
            .oneshot(multipart_request(
                "/apply",
                &ada,
                &[
                    ("name", None, "Ada Lovelace"),
                    ("exp", None, "3"),
                    ("resume", Some("cv.txt"), "Python developer with SQL and React experience"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(apply.status(), StatusCode::OK);
        let applied = body_json(apply).await;
        assert_eq!(applied["quiz_source"], "fallback");
        assert_eq!(applied["evaluation_source"], "fallback");
        assert_eq!(applied["resume_score"], 50);
        assert_eq!(applied["skills"], "python, react, sql");
        assert_eq!(applied["skills_count"], 2);
        assert!(applied["questions"][0].get("answer").is_none());

        let quiz = app
            .clone()
            .oneshot(json_request("GET", "/quiz", "", Some(&ada)))
            .await
            .unwrap();
        assert_eq!(quiz.status(), StatusCode::OK);
        assert_eq!(body_json(quiz).await["questions"].as_array().unwrap().len(), 5);

        let answers: Vec<String> = fallback_questions().into_iter().map(|q| q.answer).collect();
        let submission = serde_json::json!({ "answers": answers }).to_string();
        let submitted = app
            .clone()
            .oneshot(json_request("POST", "/quiz", &submission, Some(&ada)))
            .await
            .unwrap();
        assert_eq!(submitted.status(), StatusCode::OK);
        let result = body_json(submitted).await;
        assert_eq!(result["score"], 100);
        assert_eq!(result["selected"], 0);
        assert_eq!(result["decision_source"], "fallback");
        let candidate_id = result["candidate_id"].as_i64().unwrap();

        let replay = app
            .clone()
            .oneshot(json_request("POST", "/quiz", &submission, Some(&ada)))
            .await
            .unwrap();
        assert_eq!(replay.status(), StatusCode::NOT_FOUND);

        let dashboard = app
            .clone()
            .oneshot(json_request("GET", "/user_dashboard", "", Some(&ada)))
            .await
            .unwrap();
        assert_eq!(dashboard.status(), StatusCode::OK);
        let dashboard = body_json(dashboard).await;
        assert_eq!(dashboard["candidate"]["id"], candidate_id);
        assert_eq!(dashboard["history"].as_array().unwrap().len(), 1);
        assert_eq!(dashboard["matched_jobs"][0]["missing_skills"], serde_json::json!(["docker"]));

        let compared = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/compare",
                &format!(r#"{{"compare_ids": [{candidate_id}, 9999]}}"#),
                Some(&admin),
            ))
            .await
            .unwrap();
        assert_eq!(compared.status(), StatusCode::OK);
        let compared = body_json(compared).await;
        assert_eq!(compared["candidates"].as_array().unwrap().len(), 1);
        assert_eq!(compared["candidates"][0]["name"], "Ada Lovelace");

        let none = app
            .oneshot(json_request("POST", "/compare", "{}", Some(&admin)))
            .await
            .unwrap();
        assert!(body_json(none).await["candidates"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_apply_stores_no_upload() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path()).await;
        let upload_dir = state.config.upload_dir.clone();
        let app = build_router(state);

        app.clone()
            .oneshot(json_request(
                "POST",
                "/register",
                r#"{"username": "ada", "password": "pw"}"#,
                None,
            ))
            .await
            .unwrap();
        let ada = login(&app, "ada", "pw").await;

        let response = app
            .oneshot(multipart_request(
                "/apply",
                &ada,
                &[
                    ("resume", Some("cv.txt"), "Python developer"),
                    ("exp", None, "three"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let stored = std::fs::read_dir(&upload_dir).map(|d| d.count()).unwrap_or(0);
        assert_eq!(stored, 0);
    }
}
