// Applications: résumé upload and screening, the quiz round-trip, and the
// candidate's own dashboard. An application lives in the session until its
// quiz is submitted, then becomes one immutable `candidates` row.

pub mod handlers;
pub mod pipeline;
pub mod store;

use serde::Serialize;
use uuid::Uuid;

use crate::screening::evaluator::ResumeEvaluation;
use crate::screening::extractor::SkillReport;
use crate::screening::provenance::Sourced;
use crate::screening::quiz::QuizQuestion;

/// Screening results held server-side between `/apply` and the quiz submission.
#[derive(Debug, Clone, Serialize)]
pub struct PendingApplication {
    /// Uniqueness key of the eventual candidate row.
    pub application_id: Uuid,
    pub name: String,
    pub experience: i64,
    pub skills: SkillReport,
    pub evaluation: Sourced<ResumeEvaluation>,
    /// Best similarity across all posted jobs, 0 when there are none.
    pub resume_match: f64,
    #[serde(skip_serializing)]
    pub quiz: Sourced<Vec<QuizQuestion>>,
}
