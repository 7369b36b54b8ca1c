//! Application screening: orchestrates the steps run when a résumé is uploaded.
//!
//! Flow: extract text → skills → résumé evaluation → best job match →
//!       quiz generation → `PendingApplication`.
//!
//! Nothing here fails because a dependency is down: unreadable documents score
//! as empty, and the model-backed steps fall back to static values.

use std::path::PathBuf;

use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::admin::jobs::list_jobs;
use crate::applications::PendingApplication;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::job::JobRow;
use crate::screening::evaluator::evaluate_resume;
use crate::screening::extractor::{extract_resume_text_or_empty, extract_skills_from_text};
use crate::screening::quiz::generate_quiz;
use crate::screening::similarity::match_resume;

/// Highest similarity of `resume_text` against any job, 0 when there are none.
pub fn best_job_match(resume_text: &str, jobs: &[JobRow]) -> f64 {
    jobs.iter()
        .map(|job| match_resume(resume_text, &job.match_text()))
        .fold(0.0, f64::max)
}

pub async fn screen_application(
    pool: &SqlitePool,
    llm: &LlmClient,
    name: String,
    experience: i64,
    resume_path: PathBuf,
) -> Result<PendingApplication, AppError> {
    // PDF parsing is CPU-bound.
    let text = tokio::task::spawn_blocking(move || extract_resume_text_or_empty(&resume_path))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Extraction task failed: {e}")))?;
    if text.is_empty() {
        warn!("Resume for '{name}' produced no text; scoring as empty");
    }

    let skills = extract_skills_from_text(&text);
    info!(
        "Extracted {} core skill hits and {} listed skills for '{name}': [{}]",
        skills.count,
        skills.skill_list().len(),
        skills.skills
    );

    let evaluation = evaluate_resume(llm, &text).await;

    let jobs = list_jobs(pool).await?;
    let resume_match = best_job_match(&text, &jobs);

    let quiz = generate_quiz(llm, experience, &skills.skills).await;
    info!(
        "Screened '{name}': resume_score={} ({}), resume_match={resume_match}, quiz={} questions ({})",
        evaluation.value.score,
        evaluation.source,
        quiz.value.len(),
        quiz.source
    );
    if evaluation.is_fallback() || quiz.is_fallback() {
        warn!("Model server output unusable for '{name}'; fallback content in use");
    }

    Ok(PendingApplication {
        application_id: Uuid::new_v4(),
        name,
        experience,
        skills,
        evaluation,
        resume_match,
        quiz,
    })
}
