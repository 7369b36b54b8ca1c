//! Axum route handlers for administrators.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::admin::jobs::{insert_job, list_jobs, NewJob};
use crate::applications::store::{find_candidates_by_ids, list_candidates};
use crate::errors::AppError;
use crate::leaderboard::generate_ranking_chart;
use crate::models::candidate::CandidateRow;
use crate::models::job::JobRow;
use crate::session::AuthSession;
use crate::state::AppState;

const GLOBAL_CHART_FILE: &str = "ranking.svg";

#[derive(Debug, Serialize)]
pub struct ChartRef {
    /// Job id, or `"global"` for the overall board.
    pub id: String,
    pub title: String,
    /// Path under `/static`.
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub candidates: Vec<CandidateRow>,
    pub jobs: Vec<JobRow>,
    pub charts: Vec<ChartRef>,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub compare_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub candidates: Vec<CandidateRow>,
}

fn job_chart_file(job_id: i64) -> String {
    format!("ranking_job_{job_id}.svg")
}

/// POST /admin/job/add
pub async fn handle_add_job(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(job): Json<NewJob>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    auth.require_admin()?;
    if job.title.trim().is_empty() || job.description.trim().is_empty() {
        return Err(AppError::Validation(
            "title and description are required".into(),
        ));
    }
    let row = insert_job(&state.db, &job).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /dashboard
///
/// Re-renders one chart per job plus the overall board on every view.
/// A chart that cannot be produced is simply left out.
pub async fn handle_dashboard(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<AdminDashboard>, AppError> {
    auth.require_admin()?;
    let candidates = list_candidates(&state.db).await?;
    let jobs = list_jobs(&state.db).await?;
    let static_dir = &state.config.static_dir;

    let mut charts = Vec::new();
    if generate_ranking_chart(&state.db, &static_dir.join(GLOBAL_CHART_FILE), None).await {
        charts.push(ChartRef {
            id: "global".to_string(),
            title: "Overall Macro Leaderboard".to_string(),
            url: format!("/static/{GLOBAL_CHART_FILE}"),
        });
    }
    for job in &jobs {
        let file = job_chart_file(job.id);
        if generate_ranking_chart(&state.db, &static_dir.join(&file), Some(job.id)).await {
            charts.push(ChartRef {
                id: job.id.to_string(),
                title: job.title.clone(),
                url: format!("/static/{file}"),
            });
        }
    }

    Ok(Json(AdminDashboard {
        candidates,
        jobs,
        charts,
    }))
}

/// POST /compare
pub async fn handle_compare(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<CompareRequest>,
) -> Result<Json<CompareResponse>, AppError> {
    auth.require_admin()?;
    let candidates = find_candidates_by_ids(&state.db, &req.compare_ids).await?;
    Ok(Json(CompareResponse { candidates }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_chart_file_name() {
        assert_eq!(job_chart_file(3), "ranking_job_3.svg");
    }

    #[test]
    fn test_compare_request_defaults_to_empty() {
        let req: CompareRequest = serde_json::from_str("{}").unwrap();
        assert!(req.compare_ids.is_empty());
    }
}
