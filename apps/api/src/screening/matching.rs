//! Job qualification and skill-gap analysis.

use serde::Serialize;

use crate::models::candidate::CandidateRow;
use crate::models::job::JobRow;

/// Required skills assumed when a job lists none.
pub const DEFAULT_REQUIRED_SKILLS: &[&str] = &["python", "sql", "react", "docker", "machine learning"];

#[derive(Debug, Clone, Serialize)]
pub struct JobMatch {
    pub job: JobRow,
    pub missing_skills: Vec<String>,
}

/// Both the quiz score and the résumé score meet the job's minimums.
pub fn qualifies(quiz_score: i64, resume_score: i64, job: &JobRow) -> bool {
    quiz_score as f64 >= job.min_quiz_score && resume_score as f64 >= job.min_resume_score
}

/// Required skills not present (as substrings) in the candidate's skills text.
/// Only a missing or empty requirement list falls back to the defaults; a
/// whitespace-only list requires nothing.
pub fn skill_gap(candidate_skills: &str, required: Option<&str>) -> Vec<String> {
    let required: Vec<String> = match required.filter(|r| !r.is_empty()) {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect(),
        None => DEFAULT_REQUIRED_SKILLS.iter().map(|s| s.to_string()).collect(),
    };

    let have = candidate_skills.to_lowercase();
    required.into_iter().filter(|s| !have.contains(s.as_str())).collect()
}

/// Jobs the candidate's latest application qualifies for, each with its missing skills.
pub fn match_jobs(candidate: &CandidateRow, jobs: &[JobRow]) -> Vec<JobMatch> {
    jobs.iter()
        .filter(|job| qualifies(candidate.quiz, candidate.resume_score, job))
        .map(|job| JobMatch {
            job: job.clone(),
            missing_skills: skill_gap(&candidate.skills_list, Some(&job.skills_required)),
        })
        .collect()
}
