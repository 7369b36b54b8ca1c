//! Leaderboard: composite ranking of stored applications, optionally scoped to one job.
//!
//! composite = 0.40·resume_match + 0.30·quiz + 0.20·skills_norm + 0.10·exp_norm
//!
//! Résumé match is recomputed from each application's stored summary against the
//! job text, so a ranking always reflects the job it is drawn for.

pub mod chart;

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::{info, warn};

use crate::admin::jobs::find_job;
use crate::screening::similarity::match_resume;

/// Compared against when no job is selected.
pub const GENERIC_JOB_TEXT: &str = "software engineering machine learning nlp web application";

#[derive(Debug, Clone, Copy)]
pub struct CompositeWeights {
    pub resume_match: f64,
    pub quiz: f64,
    pub skills: f64,
    pub experience: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            resume_match: 0.40,
            quiz: 0.30,
            skills: 0.20,
            experience: 0.10,
        }
    }
}

/// The columns a ranking needs.
#[derive(Debug, Clone, FromRow)]
pub struct RankingInput {
    pub name: String,
    pub skills: i64,
    pub quiz: i64,
    pub experience: i64,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: f64,
}

/// Maps a raw count onto 0 – 100: ten points per unit, capped.
pub fn normalize(value: f64) -> f64 {
    (value * 10.0).min(100.0)
}

pub fn composite_score(resume_match: f64, quiz: f64, skills_norm: f64, exp_norm: f64) -> f64 {
    weighted_composite(
        resume_match,
        quiz,
        skills_norm,
        exp_norm,
        &CompositeWeights::default(),
    )
}

pub fn weighted_composite(
    resume_match: f64,
    quiz: f64,
    skills_norm: f64,
    exp_norm: f64,
    weights: &CompositeWeights,
) -> f64 {
    weights.resume_match * resume_match
        + weights.quiz * quiz
        + weights.skills * skills_norm
        + weights.experience * exp_norm
}

/// One entry per candidate name (their best composite), sorted ascending.
pub fn build_leaderboard(rows: &[RankingInput], job_text: Option<&str>) -> Vec<LeaderboardEntry> {
    let job_text = job_text
        .filter(|t| !t.is_empty())
        .unwrap_or(GENERIC_JOB_TEXT);

    let mut best: HashMap<&str, f64> = HashMap::new();
    for row in rows {
        let score = composite_score(
            match_resume(&row.summary, job_text),
            row.quiz as f64,
            normalize(row.skills as f64),
            normalize(row.experience as f64),
        );
        best.entry(row.name.as_str())
            .and_modify(|s| *s = s.max(score))
            .or_insert(score);
    }

    let mut entries: Vec<LeaderboardEntry> = best
        .into_iter()
        .map(|(name, score)| LeaderboardEntry {
            name: name.to_string(),
            score,
        })
        .collect();
    entries.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.name.cmp(&b.name)));
    entries
}

async fn load_ranking_inputs(
    pool: &SqlitePool,
    job_id: Option<i64>,
) -> Result<(Vec<RankingInput>, Option<String>), sqlx::Error> {
    let rows = sqlx::query_as::<_, RankingInput>(
        "SELECT name, skills, quiz, experience, summary FROM candidates",
    )
    .fetch_all(pool)
    .await?;

    let job_text = match job_id {
        Some(id) => find_job(pool, id).await?.map(|job| job.match_text()),
        None => None,
    };

    Ok((rows, job_text))
}

/// Renders the leaderboard chart for `job_id` (or the overall board) to `output_path`.
/// Returns false when there is nothing to draw or any step fails.
pub async fn generate_ranking_chart(
    pool: &SqlitePool,
    output_path: &Path,
    job_id: Option<i64>,
) -> bool {
    let (rows, job_text) = match load_ranking_inputs(pool, job_id).await {
        Ok(loaded) => loaded,
        Err(e) => {
            warn!("Error reading leaderboard data: {e}");
            return false;
        }
    };

    if rows.is_empty() {
        return false;
    }

    let entries = build_leaderboard(&rows, job_text.as_deref());
    let title = match job_id {
        Some(id) => format!("Candidate Leaderboard (Job #{id})"),
        None => "Overall Candidate Leaderboard".to_string(),
    };
    let svg = chart::render_chart_svg(&entries, &title);

    if let Some(parent) = output_path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            warn!("Cannot create chart directory {}: {e}", parent.display());
            return false;
        }
    }
    match tokio::fs::write(output_path, svg).await {
        Ok(()) => {
            info!("Rendered {} leaderboard rows to {}", entries.len(), output_path.display());
            true
        }
        Err(e) => {
            warn!("Cannot write chart {}: {e}", output_path.display());
            false
        }
    }
}
