//! Axum route handlers for the candidate flow.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::admin::jobs::list_jobs;
use crate::applications::pipeline::screen_application;
use crate::applications::store::{history_for_user, insert_candidate, QuizOutcome};
use crate::errors::AppError;
use crate::models::candidate::CandidateRow;
use crate::screening::decision::{decide, Features};
use crate::screening::matching::{match_jobs, JobMatch};
use crate::screening::provenance::Source;
use crate::screening::quiz::{grade_quiz, PublicQuestion, QuizQuestion};
use crate::session::AuthSession;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub application_id: Uuid,
    pub skills_count: i64,
    pub skills: String,
    pub resume_score: i64,
    pub resume_summary: String,
    pub evaluation_source: Source,
    pub resume_match: f64,
    pub questions: Vec<PublicQuestion>,
    pub quiz_source: Source,
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub application_id: Uuid,
    pub questions: Vec<PublicQuestion>,
    pub quiz_source: Source,
}

#[derive(Debug, Deserialize)]
pub struct QuizSubmission {
    /// Chosen option per question, by index. Missing entries count as wrong.
    #[serde(default)]
    pub answers: Vec<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct QuizResult {
    pub candidate_id: i64,
    pub score: i64,
    pub selected: i64,
    pub decision_source: Source,
}

#[derive(Debug, Serialize)]
pub struct UserDashboard {
    /// Latest application, if any.
    pub candidate: Option<CandidateRow>,
    pub matched_jobs: Vec<JobMatch>,
    /// Every application, newest first.
    pub history: Vec<CandidateRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /apply
///
/// Multipart fields: `name`, `exp` (years, integer) and the `resume` file.
/// Screens the résumé and parks the result in the session until the quiz is submitted.
pub async fn handle_apply(
    State(state): State<AppState>,
    auth: AuthSession,
    mut multipart: Multipart,
) -> Result<Json<ApplyResponse>, AppError> {
    auth.require_candidate()?;

    let mut name: Option<String> = None;
    let mut experience: Option<i64> = None;
    let mut resume: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        match field.name() {
            Some("name") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid name: {e}")))?;
                name = Some(text.trim().to_string());
            }
            Some("exp") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid exp: {e}")))?;
                let years = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| AppError::Validation("exp must be a whole number of years".into()))?;
                experience = Some(years);
            }
            Some("resume") => {
                let filename = field.file_name().unwrap_or("resume.pdf").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid file: {e}")))?;
                resume = Some((filename, data));
            }
            _ => {}
        }
    }

    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("name is required".into()))?;
    let experience = experience.ok_or_else(|| AppError::Validation("exp is required".into()))?;
    if experience < 0 {
        return Err(AppError::Validation("exp cannot be negative".into()));
    }
    let (filename, data) =
        resume.ok_or_else(|| AppError::Validation("resume file is required".into()))?;

    // Only a fully valid request touches the upload directory.
    let resume_path = stored_upload_path(&state.config.upload_dir, &filename);
    save_upload(&resume_path, &data).await?;

    info!("User {} applying as '{name}'", auth.session.user_id);
    let pending = screen_application(&state.db, &state.llm, name, experience, resume_path).await?;

    let response = ApplyResponse {
        application_id: pending.application_id,
        skills_count: pending.skills.count,
        skills: pending.skills.skills.clone(),
        resume_score: pending.evaluation.value.score,
        resume_summary: pending.evaluation.value.summary.clone(),
        evaluation_source: pending.evaluation.source,
        resume_match: pending.resume_match,
        questions: public_questions(&pending.quiz.value),
        quiz_source: pending.quiz.source,
    };

    state.sessions.set_pending(auth.id, pending).await?;
    Ok(Json(response))
}

/// GET /quiz
pub async fn handle_get_quiz(auth: AuthSession) -> Result<Json<QuizResponse>, AppError> {
    auth.require_candidate()?;
    let pending = auth
        .session
        .pending
        .ok_or_else(|| AppError::NotFound("No application in progress. Apply first.".into()))?;

    Ok(Json(QuizResponse {
        application_id: pending.application_id,
        questions: public_questions(&pending.quiz.value),
        quiz_source: pending.quiz.source,
    }))
}

/// POST /quiz
///
/// Grades the answers, runs the selection model and stores the application.
/// The pending application is consumed, so a second submission finds nothing.
pub async fn handle_submit_quiz(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(submission): Json<QuizSubmission>,
) -> Result<Json<QuizResult>, AppError> {
    auth.require_candidate()?;
    let pending = state
        .sessions
        .take_pending(auth.id)
        .await
        .ok_or_else(|| AppError::NotFound("No application in progress. Apply first.".into()))?;

    let score = grade_quiz(&pending.quiz.value, &submission.answers);
    let features = Features::new(pending.experience, pending.skills.count, score);
    let decision = decide(state.decision_model.as_deref(), &features);
    let outcome = QuizOutcome {
        quiz_score: score,
        decision,
    };

    let row = match insert_candidate(&state.db, auth.session.user_id, &pending, &outcome).await {
        Ok(row) => row,
        Err(AppError::Conflict(msg)) => return Err(AppError::Conflict(msg)),
        Err(e) => {
            // Nothing was stored; let the candidate retry.
            state.sessions.restore_pending(auth.id, pending).await;
            return Err(e);
        }
    };

    Ok(Json(QuizResult {
        candidate_id: row.id,
        score,
        selected: row.selected,
        decision_source: outcome.decision.source,
    }))
}

/// GET /user_dashboard
pub async fn handle_user_dashboard(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<UserDashboard>, AppError> {
    auth.require_candidate()?;
    let history = history_for_user(&state.db, auth.session.user_id).await?;
    let candidate = history.first().cloned();

    let matched_jobs = match &candidate {
        Some(candidate) => {
            let jobs = list_jobs(&state.db).await?;
            match_jobs(candidate, &jobs)
        }
        None => Vec::new(),
    };

    Ok(Json(UserDashboard {
        candidate,
        matched_jobs,
        history,
    }))
}

fn public_questions(questions: &[QuizQuestion]) -> Vec<PublicQuestion> {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| q.public(i))
        .collect()
}

/// Server-chosen upload path: a fresh UUID plus the client's extension.
fn stored_upload_path(upload_dir: &Path, client_filename: &str) -> PathBuf {
    let extension = Path::new(client_filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "pdf".to_string());
    upload_dir.join(format!("{}.{extension}", Uuid::new_v4()))
}

async fn save_upload(path: &Path, data: &[u8]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Cannot create upload dir: {e}")))?;
    }
    tokio::fs::write(path, data)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Cannot store upload: {e}")))?;
    info!("Stored upload at {}", path.display());
    Ok(())
}
