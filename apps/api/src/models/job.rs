use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Comma-separated, free text.
    pub skills_required: String,
    pub min_quiz_score: f64,
    pub min_resume_score: f64,
    pub created_at: NaiveDateTime,
}

impl JobRow {
    /// Text the similarity scorer compares résumés against.
    pub fn match_text(&self) -> String {
        format!("{} {}", self.description, self.skills_required)
    }
}
