use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One completed application: written once at quiz submission, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: i64,
    pub application_id: String,
    pub user_id: i64,
    pub name: String,
    pub experience: i64,
    /// Hits against the core skill list, not the length of `skills_list`.
    pub skills: i64,
    pub quiz: i64,
    pub selected: i64,
    pub resume_score: i64,
    pub summary: String,
    pub skills_list: String,
    pub resume_match: f64,
    pub evaluation_source: String,
    pub quiz_source: String,
    pub decision_source: String,
    pub created_at: NaiveDateTime,
}
